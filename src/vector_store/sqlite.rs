//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust, which is plenty for
//! a fixed show catalog of a few thousand entries.

use super::{rank_hits, CatalogEntry, Genres, SearchHit, ShowRecord, VectorStore};
use crate::error::{Result, TeveError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// SQLite-based vector store with exclusive on-disk access.
///
/// Concurrent opens of the same index are disallowed. A sidecar `.lock`
/// file marks the index as open; it is removed on drop. A lock file found
/// at open time is residue of a prior unclean shutdown and is cleared
/// before opening.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    lock_path: Option<PathBuf>,
    min_score: f32,
}

impl SqliteVectorStore {
    /// Open the index at `path`, recovering from a stale lock if one is
    /// present.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            warn!(
                lock = %lock_path.display(),
                "removing stale lock file left by an unclean shutdown"
            );
            std::fs::remove_file(&lock_path)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::create_schema(&conn)?;

        // Lock only once the index is actually open; a failed open must not
        // leave a lock behind for the next open to mistake for a crash.
        std::fs::write(&lock_path, std::process::id().to_string())?;

        info!("Opened catalog index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            lock_path: Some(lock_path),
            min_score: 0.0,
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::create_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            lock_path: None,
            min_score: 0.0,
        })
    }

    /// Set the minimum similarity score below which hits are dropped.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS shows (
                id TEXT PRIMARY KEY,
                title TEXT,
                genres TEXT,
                description TEXT,
                embedding BLOB NOT NULL,
                indexed_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

impl Drop for SqliteVectorStore {
    fn drop(&mut self) {
        if let Some(lock_path) = &self.lock_path {
            if let Err(e) = std::fs::remove_file(lock_path) {
                warn!(lock = %lock_path.display(), "failed to remove lock file: {}", e);
            }
        }
    }
}

/// Sidecar lock path for an index file: `catalog.db` -> `catalog.db.lock`.
fn lock_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".lock");
    PathBuf::from(os)
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, records))]
    async fn upsert_batch(&self, records: &[ShowRecord]) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| TeveError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let tx = conn.unchecked_transaction()?;

        for record in records {
            let genres_json = record
                .entry
                .genres
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            tx.execute(
                r#"
                INSERT OR REPLACE INTO shows
                (id, title, genres, description, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    record.id.to_string(),
                    record.entry.title,
                    genres_json,
                    record.entry.description,
                    Self::embedding_to_bytes(&record.embedding),
                    record.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} catalog entries", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| TeveError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            "SELECT id, title, genres, description, embedding, indexed_at FROM shows",
        )?;

        let records = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let genres_json: Option<String> = row.get(2)?;
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let indexed_at_str: String = row.get(5)?;

            Ok(ShowRecord {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                entry: CatalogEntry {
                    title: row.get(1)?,
                    genres: genres_json
                        .and_then(|j| serde_json::from_str::<Genres>(&j).ok()),
                    description: row.get(3)?,
                },
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let scored: Vec<(ShowRecord, f32)> = records
            .filter_map(|r| r.ok())
            .map(|record| {
                let score = super::cosine_similarity(query_embedding, &record.embedding);
                (record, score)
            })
            .collect();

        let hits = rank_hits(scored, top_k, self.min_score);
        debug!("Found {} matching catalog entries", hits.len());
        Ok(hits)
    }

    async fn entry_count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| TeveError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM shows", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
