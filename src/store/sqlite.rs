//! SQLite-backed [`VectorStore`].
//!
//! One `records` table holds chunk text, metadata, and the embedding as a
//! little-endian f32 BLOB. Similarity search is brute-force cosine over
//! all stored vectors, computed in process; for the corpus sizes this
//! system targets that is cheaper than maintaining a vector index.

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, Embedder};
use crate::error::PipelineError;
use crate::models::{Chunk, EmbeddingRecord, RelevanceResult};

use super::{build_records, rank, VectorStore};

pub struct SqliteStore {
    pool: SqlitePool,
    embedder: Arc<dyn Embedder>,
}

impl SqliteStore {
    /// Open the store at `path`, creating the file and schema if missing.
    /// Idempotent: reopening an existing store leaves its contents intact.
    pub async fn open_or_create(
        path: &Path,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, PipelineError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| PipelineError::StoreUnavailable(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                start_index INTEGER NOT NULL,
                text TEXT NOT NULL,
                hash TEXT NOT NULL,
                embedding BLOB NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_source ON records(source)")
            .execute(&pool)
            .await?;

        Ok(Self { pool, embedder })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn list_sources(&self) -> Result<BTreeSet<String>, PipelineError> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT DISTINCT source FROM records")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn add_records(&self, chunks: &[Chunk]) -> Result<usize, PipelineError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(PipelineError::EmbeddingFailure(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }
        let records = build_records(chunks, vectors);

        let mut tx = self.pool.begin().await?;
        for record in &records {
            sqlx::query(
                "INSERT INTO records (id, source, start_index, text, hash, embedding) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.id)
            .bind(&record.source)
            .bind(record.start_index as i64)
            .bind(&record.text)
            .bind(&record.hash)
            .bind(vec_to_blob(&record.embedding))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(records.len())
    }

    async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RelevanceResult>, PipelineError> {
        let query_vec = self.embedder.embed_query(query).await?;

        let rows = sqlx::query("SELECT id, source, start_index, text, hash, embedding FROM records")
            .fetch_all(&self.pool)
            .await?;

        let results: Vec<RelevanceResult> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let embedding = blob_to_vec(&blob);
                let score = cosine_similarity(&query_vec, &embedding);
                let start_index: i64 = row.get("start_index");
                RelevanceResult {
                    record: EmbeddingRecord {
                        id: row.get("id"),
                        source: row.get("source"),
                        text: row.get("text"),
                        start_index: start_index as usize,
                        embedding,
                        hash: row.get("hash"),
                    },
                    score,
                }
            })
            .collect();

        Ok(rank(results, top_k))
    }
}
