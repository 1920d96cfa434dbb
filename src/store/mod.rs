//! Embedding store abstraction.
//!
//! The [`VectorStore`] trait is the capability boundary around whatever
//! engine persists chunk text and vectors: the shipped backend is SQLite
//! ([`sqlite::SqliteStore`]), tests use [`memory::InMemoryStore`]. Both
//! hold an [`Embedder`] and embed on write, so callers only ever hand
//! over chunks and query text.
//!
//! Records are append-only. Concurrent writers racing on the same source
//! name can both observe "not present" and both commit; the store does
//! not serialize that race and the ingestion pipeline documents it as an
//! accepted gap.

pub mod memory;
pub mod sqlite;

use std::collections::BTreeSet;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{Chunk, EmbeddingRecord, RelevanceResult};

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Distinct `source` values present in the store, derived from the
    /// persisted metadata.
    async fn list_sources(&self) -> Result<BTreeSet<String>, PipelineError>;

    /// Embed and append one record per chunk. Durable before returning.
    /// Returns the number of records written.
    async fn add_records(&self, chunks: &[Chunk]) -> Result<usize, PipelineError>;

    /// Embed `query` and return the `top_k` nearest records with a
    /// relevance score each, ordered by descending relevance.
    async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RelevanceResult>, PipelineError>;
}

pub(crate) fn text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub(crate) fn build_records(chunks: &[Chunk], vectors: Vec<Vec<f32>>) -> Vec<EmbeddingRecord> {
    chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, embedding)| EmbeddingRecord {
            id: Uuid::new_v4().to_string(),
            source: chunk.source.clone(),
            text: chunk.text.clone(),
            start_index: chunk.start_index,
            embedding,
            hash: text_hash(&chunk.text),
        })
        .collect()
}

/// Sort scored records by descending score (id as a deterministic
/// tiebreak) and keep the best `top_k`.
pub(crate) fn rank(mut results: Vec<RelevanceResult>, top_k: usize) -> Vec<RelevanceResult> {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });
    results.truncate(top_k);
    results
}
