//! Query language detection.
//!
//! The catalog and the generation model are English-only, so the only
//! distinction that matters downstream is "needs translation" vs. not.

use serde::{Deserialize, Serialize};

/// Detected language of a query or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    /// Neither Cyrillic nor Latin script. Treated as English downstream.
    Other,
}

impl Language {
    /// Classify the script of a text with a single linear scan.
    ///
    /// Returns `Ru` if the text contains at least one Cyrillic alphabetic
    /// character. Pure and total: the same input always yields the same
    /// classification and no input fails.
    pub fn detect(text: &str) -> Language {
        let mut saw_alphabetic = false;
        for c in text.chars() {
            if ('\u{0400}'..='\u{04FF}').contains(&c) {
                return Language::Ru;
            }
            if c.is_alphabetic() {
                saw_alphabetic = true;
            }
        }
        if saw_alphabetic {
            Language::En
        } else {
            Language::Other
        }
    }

    /// Whether a query in this language must be translated before retrieval.
    pub fn needs_translation(self) -> bool {
        matches!(self, Language::Ru)
    }

    /// ISO 639-1 code used on the translation wire. `Other` maps to "en"
    /// because the pipeline accepts it as English.
    pub fn code(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En | Language::Other => "en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
