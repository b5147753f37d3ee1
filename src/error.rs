//! Error types for Teve.
//!
//! Only locally unrecoverable conditions are modeled as errors: missing
//! configuration, embedding failures, and vector-store faults. Transient
//! translation and generation failures are tagged outcomes at their call
//! sites, not errors.

use thiserror::Error;

/// Library-level error type for Teve operations.
#[derive(Error, Debug)]
pub enum TeveError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Teve operations.
pub type Result<T> = std::result::Result<T, TeveError>;
