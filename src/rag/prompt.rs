//! Grounded prompt construction from retrieval hits.

use crate::config::{Prompts, RagPrompts};
use crate::vector_store::SearchHit;
use std::collections::HashMap;

/// Fixed response for queries with no matching catalog entries. The
/// generation client is never called in that case.
pub const NO_MATCHES_MESSAGE: &str = "No relevant shows found in the catalog for this query.";

/// Placeholder substituted for payload fields the catalog does not carry.
const MISSING_FIELD: &str = "unknown";

/// A fully assembled prompt: the grounding context plus the instruction
/// pair sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedPrompt {
    pub system_instruction: String,
    pub user_instruction: String,
    pub context_block: String,
}

/// Result of prompt construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltPrompt {
    Grounded(GroundedPrompt),
    /// No hits: the caller must short-circuit to [`NO_MATCHES_MESSAGE`].
    NoMatches,
}

/// Assembles grounded prompts from a query and its retrieval hits.
pub struct PromptBuilder {
    prompts: RagPrompts,
}

impl PromptBuilder {
    pub fn new(prompts: RagPrompts) -> Self {
        Self { prompts }
    }

    /// Build a prompt for the primary query path.
    pub fn build(&self, query: &str, hits: &[SearchHit]) -> BuiltPrompt {
        self.build_inner(query, hits, false)
    }

    /// Build a prompt for the inspection path: same context, with an extra
    /// machine-checkable emphasis that non-context information is forbidden.
    pub fn build_strict(&self, query: &str, hits: &[SearchHit]) -> BuiltPrompt {
        self.build_inner(query, hits, true)
    }

    fn build_inner(&self, query: &str, hits: &[SearchHit], strict: bool) -> BuiltPrompt {
        if hits.is_empty() {
            return BuiltPrompt::NoMatches;
        }

        let context_block = render_context(hits);

        let mut system_instruction = self.prompts.system.clone();
        if strict {
            system_instruction.push_str(&self.prompts.strict_suffix);
        }

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), query.to_string());
        vars.insert("context".to_string(), context_block.clone());
        let user_instruction = Prompts::render(&self.prompts.user, &vars);

        BuiltPrompt::Grounded(GroundedPrompt {
            system_instruction,
            user_instruction,
            context_block,
        })
    }
}

/// Render the context block: one line per hit, in retrieval order.
///
/// A pure function of the hits; the query and any prior conversation never
/// leak in.
fn render_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            format!(
                "- Title: {}, Genres: {}, Description: {}",
                hit.entry.title.as_deref().unwrap_or(MISSING_FIELD),
                hit.entry
                    .genres
                    .as_ref()
                    .map(|g| g.to_string())
                    .unwrap_or_else(|| MISSING_FIELD.to_string()),
                hit.entry.description.as_deref().unwrap_or(MISSING_FIELD),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{CatalogEntry, Genres, SearchHit};

    fn hit(title: &str, genres: &str, description: &str, rank: usize) -> SearchHit {
        SearchHit {
            entry: CatalogEntry::new(title, genres, description),
            score: 1.0 / rank as f32,
            rank,
        }
    }

    fn builder() -> PromptBuilder {
        PromptBuilder::new(RagPrompts::default())
    }

    #[test]
    fn empty_hits_short_circuit() {
        assert_eq!(builder().build("anything", &[]), BuiltPrompt::NoMatches);
        assert_eq!(builder().build_strict("anything", &[]), BuiltPrompt::NoMatches);
    }

    #[test]
    fn context_lines_use_fixed_format_in_retrieval_order() {
        let hits = vec![
            hit("Firefly", "sci-fi", "Space western", 1),
            hit("The Office", "comedy", "Paper company mockumentary", 2),
        ];

        let BuiltPrompt::Grounded(prompt) = builder().build("q", &hits) else {
            panic!("expected grounded prompt");
        };

        assert_eq!(
            prompt.context_block,
            "- Title: Firefly, Genres: sci-fi, Description: Space western\n\
             - Title: The Office, Genres: comedy, Description: Paper company mockumentary"
        );
    }

    #[test]
    fn missing_fields_get_placeholder() {
        let hits = vec![SearchHit {
            entry: CatalogEntry {
                title: Some("Firefly".to_string()),
                genres: None,
                description: None,
            },
            score: 0.9,
            rank: 1,
        }];

        let BuiltPrompt::Grounded(prompt) = builder().build("q", &hits) else {
            panic!("expected grounded prompt");
        };
        assert_eq!(
            prompt.context_block,
            "- Title: Firefly, Genres: unknown, Description: unknown"
        );
    }

    #[test]
    fn genre_lists_render_comma_separated() {
        let hits = vec![SearchHit {
            entry: CatalogEntry {
                title: Some("Firefly".to_string()),
                genres: Some(Genres::Many(vec![
                    "sci-fi".to_string(),
                    "western".to_string(),
                ])),
                description: Some("d".to_string()),
            },
            score: 0.9,
            rank: 1,
        }];

        let BuiltPrompt::Grounded(prompt) = builder().build("q", &hits) else {
            panic!("expected grounded prompt");
        };
        assert!(prompt
            .context_block
            .contains("Genres: sci-fi, western"));
    }

    #[test]
    fn context_rendering_is_deterministic() {
        let hits = vec![
            hit("A", "g1", "d1", 1),
            hit("B", "g2", "d2", 2),
            hit("C", "g3", "d3", 3),
        ];
        let first = render_context(&hits);
        let second = render_context(&hits);
        assert_eq!(first, second);
    }

    #[test]
    fn context_block_never_contains_the_query() {
        let hits = vec![hit("Firefly", "sci-fi", "Space western", 1)];
        let query = "UNIQUE-QUERY-MARKER";

        let BuiltPrompt::Grounded(prompt) = builder().build(query, &hits) else {
            panic!("expected grounded prompt");
        };
        assert!(!prompt.context_block.contains(query));
        // The query belongs in the user instruction instead.
        assert!(prompt.user_instruction.contains(query));
    }

    #[test]
    fn strict_mode_appends_grounding_emphasis() {
        let hits = vec![hit("Firefly", "sci-fi", "d", 1)];

        let BuiltPrompt::Grounded(normal) = builder().build("q", &hits) else {
            panic!("expected grounded prompt");
        };
        let BuiltPrompt::Grounded(strict) = builder().build_strict("q", &hits) else {
            panic!("expected grounded prompt");
        };

        assert!(!normal.system_instruction.contains("FORBIDDEN"));
        assert!(strict.system_instruction.contains("FORBIDDEN"));
        assert_eq!(normal.context_block, strict.context_block);
    }
}
