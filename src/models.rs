//! Core data types that flow through the ingestion and answer pipelines.

use std::collections::BTreeSet;

use serde::Serialize;

/// A loaded file before chunking. `source` is the base filename and acts
/// as the dedup key and citation unit for everything derived from it.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    pub text: String,
}

/// A contiguous window of a document's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source: String,
    pub text: String,
    /// Character offset of the chunk's first character in the parent text.
    pub start_index: usize,
}

/// A persisted chunk with its embedding vector. Append-only.
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
    pub id: String,
    pub source: String,
    pub text: String,
    pub start_index: usize,
    pub embedding: Vec<f32>,
    /// SHA-256 of the chunk text.
    pub hash: String,
}

/// A record paired with its relevance to a query. Transient.
#[derive(Debug, Clone)]
pub struct RelevanceResult {
    pub record: EmbeddingRecord,
    /// Cosine similarity between the query and record embeddings.
    pub score: f32,
}

/// Outcome of an ingestion call. A batch containing any already-indexed
/// source is rejected wholesale; there is no partial write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestResult {
    Success {
        chunks_written: usize,
    },
    DuplicateRejected {
        duplicate_sources: BTreeSet<String>,
    },
}

/// Guidance text returned when no chunk clears the similarity threshold.
pub const NO_CONTEXT_MESSAGE: &str =
    "No relevant information found in documents. Try another question.";

/// A grounded answer plus the sources that contributed context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub answer: String,
    /// Unique source filenames, ordered by first occurrence in the
    /// ranked results.
    pub sources: Vec<String>,
}

impl AnswerResult {
    /// The "no relevant context" sentinel: guidance text, empty sources.
    pub fn no_context() -> Self {
        Self {
            answer: NO_CONTEXT_MESSAGE.to_string(),
            sources: Vec::new(),
        }
    }

    pub fn is_no_context(&self) -> bool {
        self.sources.is_empty() && self.answer == NO_CONTEXT_MESSAGE
    }
}
