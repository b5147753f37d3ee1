//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::vector_store::{SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the search command: raw retrieval without prompt assembly or
/// generation.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&format!("{}", e));
        Output::info("Run 'teve doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let embedder = OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    );
    let store = SqliteVectorStore::new(&settings.sqlite_path())?
        .with_min_score(settings.rag.min_score);

    let spinner = Output::spinner("Searching...");
    let embedding = embedder.embed(query).await;

    let hits = match embedding {
        Ok(embedding) => store.search(&embedding, limit).await,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    match hits {
        Ok(hits) if hits.is_empty() => {
            Output::warning("No shows found matching your query.");
        }
        Ok(hits) => {
            Output::success(&format!("Found {} shows", hits.len()));
            for hit in &hits {
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
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
