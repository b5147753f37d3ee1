//! Vector store abstraction over the pre-built show catalog.
//!
//! Provides a trait-based interface for different vector index backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Genres as stored in catalog payloads: some entries carry a single
/// string, others a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Genres {
    One(String),
    Many(Vec<String>),
}

impl std::fmt::Display for Genres {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Genres::One(g) => f.write_str(g),
            Genres::Many(gs) => f.write_str(&gs.join(", ")),
        }
    }
}

/// One show's payload in the catalog. Immutable; sourced from a pre-built
/// index and never created or mutated by the query pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: Option<String>,
    pub genres: Option<Genres>,
    pub description: Option<String>,
}

impl CatalogEntry {
    pub fn new(title: &str, genres: &str, description: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            genres: Some(Genres::One(genres.to_string())),
            description: Some(description.to_string()),
        }
    }
}

/// A catalog entry as persisted in the index: payload plus its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// The show payload.
    pub entry: CatalogEntry,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl ShowRecord {
    /// Create a new record for an entry.
    pub fn new(entry: CatalogEntry, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entry,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A retrieval hit: payload, similarity score, and 1-based rank.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub entry: CatalogEntry,
    pub score: f32,
    pub rank: usize,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk insert records. Present for tests and external seeding tools;
    /// the query pipeline itself never writes.
    async fn upsert_batch(&self, records: &[ShowRecord]) -> Result<usize>;

    /// Search for the `top_k` most similar entries, ordered by descending
    /// similarity. An empty catalog yields an empty vec, never an error.
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>>;

    /// Total number of indexed entries.
    async fn entry_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Rank scored records into an ordered hit list.
///
/// Ties sort by record id so the ordering is deterministic for a fixed
/// index state.
pub(crate) fn rank_hits(
    mut scored: Vec<(ShowRecord, f32)>,
    top_k: usize,
    min_score: f32,
) -> Vec<SearchHit> {
    scored.retain(|(_, score)| *score >= min_score);
    scored.sort_by(|(ra, a), (rb, b)| {
        b.partial_cmp(a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| ra.id.cmp(&rb.id))
    });
    scored.truncate(top_k);

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (record, score))| SearchHit {
            entry: record.entry,
            score,
            rank: i + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn genres_deserialize_from_string_or_list() {
        let one: CatalogEntry =
            serde_json::from_str(r#"{"title":"Firefly","genres":"sci-fi","description":"d"}"#)
                .unwrap();
        assert_eq!(one.genres.unwrap().to_string(), "sci-fi");

        let many: CatalogEntry = serde_json::from_str(
            r#"{"title":"Firefly","genres":["sci-fi","western"],"description":"d"}"#,
        )
        .unwrap();
        assert_eq!(many.genres.unwrap().to_string(), "sci-fi, western");
    }

    #[test]
    fn missing_payload_fields_deserialize_as_none() {
        let entry: CatalogEntry = serde_json::from_str(r#"{"title":"Firefly"}"#).unwrap();
        assert!(entry.genres.is_none());
        assert!(entry.description.is_none());
    }

    #[test]
    fn rank_hits_orders_by_descending_score() {
        let records = vec![
            (ShowRecord::new(CatalogEntry::new("a", "g", "d"), vec![]), 0.2),
            (ShowRecord::new(CatalogEntry::new("b", "g", "d"), vec![]), 0.9),
            (ShowRecord::new(CatalogEntry::new("c", "g", "d"), vec![]), 0.5),
        ];

        let hits = rank_hits(records, 2, 0.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entry.title.as_deref(), Some("b"));
        assert_eq!(hits[0].rank, 1);
        assert_eq!(hits[1].entry.title.as_deref(), Some("c"));
        assert_eq!(hits[1].rank, 2);
    }

    #[test]
    fn rank_hits_applies_min_score() {
        let records = vec![
            (ShowRecord::new(CatalogEntry::new("a", "g", "d"), vec![]), 0.1),
        ];
        assert!(rank_hits(records, 3, 0.3).is_empty());
    }
}
