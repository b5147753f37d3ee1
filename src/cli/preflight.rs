//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config;
use crate::error::{Result, TeveError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking requires the embedding key; translation/generation degrade.
    Ask,
    /// Inspection requires the embedding key only.
    Inspect,
    /// Raw search requires the embedding key only.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all hard requirements pass. Missing translation or
/// generation secrets are not hard failures; those clients degrade.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Inspect | Operation::Search => {
            check_embedding_key()?;
        }
    }
    Ok(())
}

/// Whether the translation and generation services have their secrets.
pub fn external_services_ready() -> bool {
    config::external_services_configured()
}

/// Check if the OpenAI API key for embeddings is configured. Retrieval
/// cannot run without it, so this is a hard requirement.
fn check_embedding_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(TeveError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(TeveError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
