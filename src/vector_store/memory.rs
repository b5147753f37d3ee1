//! In-memory vector store implementation, used in tests and pipeline
//! experiments where persistence is not needed.

use super::{rank_hits, SearchHit, ShowRecord, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector store.
#[derive(Default)]
pub struct MemoryVectorStore {
    records: RwLock<Vec<ShowRecord>>,
    min_score: f32,
}

impl MemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    pub fn with_records(records: Vec<ShowRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            min_score: 0.0,
        }
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, records: &[ShowRecord]) -> Result<usize> {
        let mut store = self
            .records
            .write()
            .map_err(|e| crate::error::TeveError::VectorStore(e.to_string()))?;
        store.extend_from_slice(records);
        Ok(records.len())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let store = self
            .records
            .read()
            .map_err(|e| crate::error::TeveError::VectorStore(e.to_string()))?;

        let scored: Vec<(ShowRecord, f32)> = store
            .iter()
            .map(|record| {
                let score = super::cosine_similarity(query_embedding, &record.embedding);
                (record.clone(), score)
            })
            .collect();

        Ok(rank_hits(scored, top_k, self.min_score))
    }

    async fn entry_count(&self) -> Result<usize> {
        let store = self
            .records
            .read()
            .map_err(|e| crate::error::TeveError::VectorStore(e.to_string()))?;
        Ok(store.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::CatalogEntry;

    #[tokio::test]
    async fn test_memory_store_search_ordering() {
        let store = MemoryVectorStore::new();
        store
            .upsert_batch(&[
                ShowRecord::new(CatalogEntry::new("far", "g", "d"), vec![0.0, 1.0]),
                ShowRecord::new(CatalogEntry::new("near", "g", "d"), vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.title.as_deref(), Some("near"));
    }

    #[tokio::test]
    async fn test_empty_memory_store() {
        let store = MemoryVectorStore::new();
        assert_eq!(store.entry_count().await.unwrap(), 0);
        assert!(store.search(&[1.0], 3).await.unwrap().is_empty());
    }
}
