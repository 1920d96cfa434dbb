//! In-memory [`VectorStore`] for tests.
//!
//! Records live in a `Vec` behind an `RwLock`; search is the same
//! brute-force cosine scan the SQLite backend performs.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::embedding::{cosine_similarity, Embedder};
use crate::error::PipelineError;
use crate::models::{Chunk, RelevanceResult};

use super::{build_records, rank, VectorStore};

pub struct InMemoryStore {
    records: RwLock<Vec<crate::models::EmbeddingRecord>>,
    embedder: Arc<dyn Embedder>,
}

impl InMemoryStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            embedder,
        }
    }

    /// Number of records currently held. Test helper.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn list_sources(&self) -> Result<BTreeSet<String>, PipelineError> {
        let records = self.records.read().unwrap();
        Ok(records.iter().map(|r| r.source.clone()).collect())
    }

    async fn add_records(&self, chunks: &[Chunk]) -> Result<usize, PipelineError> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        let new_records = build_records(chunks, vectors);
        let written = new_records.len();
        self.records.write().unwrap().extend(new_records);
        Ok(written)
    }

    async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RelevanceResult>, PipelineError> {
        let query_vec = self.embedder.embed_query(query).await?;
        let records = self.records.read().unwrap();
        let results: Vec<RelevanceResult> = records
            .iter()
            .map(|record| RelevanceResult {
                record: record.clone(),
                score: cosine_similarity(&query_vec, &record.embedding),
            })
            .collect();
        Ok(rank(results, top_k))
    }
}
