//! Teve - TV Show Recommendations with RAG
//!
//! A CLI tool that answers natural-language questions about a fixed catalog
//! of television shows, in English or Russian.
//!
//! The name "Teve" comes from the Norwegian colloquial word for "TV."
//!
//! # Overview
//!
//! Teve allows you to:
//! - Ask for show recommendations grounded in a pre-built catalog index
//! - Query in Russian against an English-only catalog and model
//! - Inspect exactly which catalog entries an answer is grounded on
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `lang` - Query language detection
//! - `translate` - Translation bridging (Russian <-> English)
//! - `embedding` - Query embedding generation
//! - `vector_store` - Vector index over the show catalog
//! - `rag` - Grounded prompt construction and answer generation
//! - `pipeline` - Query pipeline orchestration
//!
//! # Example
//!
//! ```rust,no_run
//! use teve::config::Settings;
//! use teve::pipeline::QueryPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = QueryPipeline::from_settings(&settings)?;
//!
//!     let outcome = pipeline.run("комедия про космос").await?;
//!     println!("{}", outcome.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod lang;
pub mod pipeline;
pub mod rag;
pub mod translate;
pub mod vector_store;

pub use error::{Result, TeveError};
