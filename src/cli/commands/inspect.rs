//! Inspect command - verify grounding without calling the generator.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::QueryPipeline;
use anyhow::Result;

/// Run the inspect command: show the raw retrieval hits and the exact
/// prompt components that would be sent to the generation backend.
pub async fn run_inspect(query: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Inspect) {
        Output::error(&format!("{}", e));
        Output::info("Run 'teve doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = QueryPipeline::from_settings(&settings)?;

    let spinner = Output::spinner("Inspecting retrieval...");
    let inspection = pipeline.inspect(query).await;
    spinner.finish_and_clear();

    let inspection = match inspection {
        Ok(inspection) => inspection,
        Err(e) => {
            Output::error(&format!("Inspection failed: {}", e));
            return Err(e.into());
        }
    };

    Output::header("Query");
    Output::kv("detected language", inspection.detected.code());
    if let Some(translated) = &inspection.translated_query {
        Output::kv("translated query", translated);
    }

    Output::header("Raw hits");
    if inspection.hits.is_empty() {
        Output::warning("No catalog entries matched.");
    } else {
        println!("{}", serde_json::to_string_pretty(&inspection.hits)?);
    }

    if let Some(prompt) = &inspection.prompt {
        Output::header("System instruction");
        println!("{}", prompt.system_instruction);

        Output::header("Context block");
        println!("{}", prompt.context_block);

        Output::header("User instruction");
        println!("{}", prompt.user_instruction);
    } else {
        Output::info("No prompt assembled: the generator would not be called for this query.");
    }

    Ok(())
}
