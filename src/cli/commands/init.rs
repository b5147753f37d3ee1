//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::{Settings, ENV_GPT_API_KEY, ENV_GPT_FOLDER_ID, ENV_TRANSLATE_API_KEY};
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Teve Setup");
    println!();
    println!("Welcome to Teve! Let's make sure everything is configured correctly.\n");

    // Step 1: Check API keys
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    let mut missing = Vec::new();
    if std::env::var("OPENAI_API_KEY").is_err() {
        missing.push(("OPENAI_API_KEY", "query embeddings (required)"));
    }
    for (name, feature) in [
        (ENV_TRANSLATE_API_KEY, "Russian query/answer translation"),
        (ENV_GPT_API_KEY, "answer generation"),
        (ENV_GPT_FOLDER_ID, "answer generation"),
    ] {
        if std::env::var(name).is_err() {
            missing.push((name, feature));
        }
    }

    if missing.is_empty() {
        Output::success("All API keys are configured!");
    } else {
        Output::warning("Some API keys are missing:");
        println!();
        for (name, feature) in &missing {
            println!("  {} {} - {}", style("✗").red(), style(name).bold(), feature);
        }
        println!();
        println!("  Set them in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!("  {}", style("export YANDEX_TRANSLATE_API_KEY='...'").green());
        println!("  {}", style("export YANDEX_GPT_API_KEY='...'").green());
        println!("  {}", style("export YANDEX_FOLDER_ID='...'").green());
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Set the missing keys and run 'teve init' again.");
            return Ok(());
        }
    }

    println!();

    // Step 2: Create directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        Output::info(&format!("Catalog index found: {}", db_path.display()));
    } else {
        Output::warning(&format!(
            "No catalog index at {}. Point vector_store.sqlite_path at a pre-built index.",
            db_path.display()
        ));
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("teve config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check configuration status", style("teve doctor").cyan());
    println!("  {} Ask for a recommendation", style("teve ask \"comedy about space\"").cyan());
    println!("  {} Verify grounding for a query", style("teve inspect \"<query>\"").cyan());
    println!();
    println!("For more help: {}", style("teve --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
