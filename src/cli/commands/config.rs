//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::process::Command;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&settings)?;
            println!("{}", content);
        }

        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created config file: {}", config_path.display()));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            let status = Command::new(&editor).arg(&config_path).status()?;
            if !status.success() {
                Output::error(&format!("Editor '{}' exited with an error", editor));
            }
        }
    }

    Ok(())
}
