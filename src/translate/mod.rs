//! Translation bridging between the user's language and the catalog's.
//!
//! Translation is treated as an opaque external capability: it can fail or
//! be unconfigured, and the pipeline must keep going with the original text.

mod yandex;

pub use yandex::YandexTranslator;

use crate::lang::Language;
use async_trait::async_trait;

/// Outcome of a translation attempt.
///
/// Translation never surfaces as an error to callers; a failed or skipped
/// call degrades to the untranslated text instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The service returned a translation.
    Translated(String),
    /// No call was made (empty input, or the service is not configured).
    Skipped(String),
    /// The call failed; the original text is carried through unchanged.
    Failed { original: String },
}

impl TranslationOutcome {
    /// The text to continue the pipeline with.
    pub fn text(&self) -> &str {
        match self {
            TranslationOutcome::Translated(t) => t,
            TranslationOutcome::Skipped(t) => t,
            TranslationOutcome::Failed { original } => original,
        }
    }

    /// Consume the outcome, yielding the text to continue with.
    pub fn into_text(self) -> String {
        match self {
            TranslationOutcome::Translated(t) => t,
            TranslationOutcome::Skipped(t) => t,
            TranslationOutcome::Failed { original } => original,
        }
    }

    /// Whether the text was actually translated.
    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }
}

/// Trait for text translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`. The source language may be pinned by
    /// the caller; `None` lets the service autodetect.
    ///
    /// Must not retry automatically and must not fail: any problem yields
    /// `TranslationOutcome::Failed` carrying the original text.
    async fn translate(
        &self,
        text: &str,
        target: Language,
        source: Option<Language>,
    ) -> TranslationOutcome;
}
