//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::lang::Language;
use crate::pipeline::QueryPipeline;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    query: &str,
    top_k: Option<usize>,
    translate: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'teve doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if !preflight::external_services_ready() {
        Output::warning(
            "Translation/generation API keys are not fully configured; answers will degrade.",
        );
    }

    let mut pipeline = QueryPipeline::from_settings(&settings)?;
    if let Some(top_k) = top_k {
        pipeline = pipeline.with_top_k(top_k);
    }

    let spinner = Output::spinner("Searching the catalog...");
    let outcome = pipeline.run(query).await;
    spinner.finish_and_clear();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    };

    if let Some(translated) = &outcome.translated_query {
        Output::info(&format!("Query translated for retrieval: {}", translated));
    }

    println!("\n{}\n", outcome.answer);

    if !outcome.hits.is_empty() {
        Output::header("Matched shows");
        for hit in &outcome.hits {
            Output::show_result(
                hit.rank,
                hit.entry.title.as_deref().unwrap_or("unknown"),
                &hit.entry
                    .genres
                    .as_ref()
                    .map(|g| g.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                hit.score,
                hit.entry.description.as_deref().unwrap_or(""),
            );
        }
    }

    // On-demand translate-out for answers that stayed English.
    if translate && outcome.language == Language::En {
        let spinner = Output::spinner("Translating answer...");
        let translated = pipeline.translate_answer(&outcome.state).await;
        spinner.finish_and_clear();

        match translated {
            Some(t) if t.is_translated() => {
                Output::header("Answer in Russian");
                println!("\n{}\n", t.text());
            }
            Some(_) => Output::warning("Translation unavailable, keeping the English answer."),
            None => {}
        }
    }

    Ok(())
}
