//! RAG (Retrieval-Augmented Generation) for grounded show recommendations.
//!
//! Turns retrieved catalog entries into a grounded prompt and sends it to
//! the generation backend.

mod generation;
pub mod prompt;

pub use generation::{GenerationClient, Generated, YandexGptClient, NOT_CONFIGURED_MESSAGE};
pub use prompt::{BuiltPrompt, GroundedPrompt, PromptBuilder, NO_MATCHES_MESSAGE};
