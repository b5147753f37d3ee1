//! Prompt templates for Teve.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
}

/// Prompts for grounded answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    /// Appended to the system prompt on the inspection path so grounding
    /// violations are machine-checkable.
    pub strict_suffix: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a TV show recommendation assistant.

Guidelines:
- Answer the user's question using ONLY the shows listed in the context
- Recommend shows by title and explain briefly why each one matches
- If the context does not contain enough information to answer, say so explicitly instead of inventing shows
- Never mention shows that are not in the context"#
                .to_string(),

            strict_suffix: r#"

IMPORTANT: Using any information that is not present in the context is FORBIDDEN. If the context is insufficient, reply exactly that you do not have enough information."#
                .to_string(),

            user: r#"Shows from the catalog:
{{context}}

Question: {{question}}

Answer using only the shows above."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, with an optional custom directory.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}
