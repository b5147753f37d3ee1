//! Embedding generation for semantic retrieval.
//!
//! Retrieval cannot proceed without a query vector, so unlike translation
//! and generation, embedding failures are fatal to the pipeline.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text. Deterministic for a fixed
    /// model version: identical input yields identical vectors bar numeric
    /// jitter in the backend.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}
