//! Error taxonomy for the ingestion and answer pipelines.
//!
//! Every fallible core operation returns [`PipelineError`]. Duplicate
//! rejection and the no-context sentinel are *not* errors — they are
//! first-class result variants (see [`crate::models::IngestResult`] and
//! [`crate::models::AnswerResult`]).
//!
//! The core performs no retries: a store, embedding, or LLM failure
//! surfaces to the caller as a terminal failure for that request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A file could not be read or its format is not handled by the loader.
    #[error("unsupported or unreadable file '{file}': {reason}")]
    UnsupportedFormat { file: String, reason: String },

    /// The embedding store could not be opened, read, or written.
    #[error("embedding store unavailable: {0}")]
    StoreUnavailable(String),

    /// The embedding provider failed (missing credentials, API error, timeout).
    #[error("embedding failed: {0}")]
    EmbeddingFailure(String),

    /// The language model invocation failed.
    #[error("answer generation failed: {0}")]
    AnswerGenerationFailure(String),
}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        PipelineError::StoreUnavailable(e.to_string())
    }
}
