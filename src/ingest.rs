//! Ingestion pipeline: files → documents → chunks → embedding store.
//!
//! The duplicate policy is all-or-nothing on purpose: if any file in the
//! batch has a `source` name already present in the store, the whole
//! batch is rejected and nothing is written, including files whose names
//! are new. The caller renames the conflicting files and resubmits the
//! full batch. Per-file skipping would leave ambiguous, partially-indexed
//! batches behind.
//!
//! Duplicate detection is by filename only, never content hash: a renamed
//! copy of an indexed file is silently re-indexed, and a different file
//! with a taken name is rejected.
//!
//! Two ingest calls racing on the same new source name can both observe
//! "not present" and both commit. That race is accepted and not locked
//! against.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::chunker::split_documents;
use crate::config::ChunkingConfig;
use crate::error::PipelineError;
use crate::loader::load_paths;
use crate::models::IngestResult;
use crate::store::VectorStore;

/// Load, chunk, and commit a batch of files.
///
/// Returns [`IngestResult::DuplicateRejected`] naming every conflicting
/// filename when any batch source is already indexed, otherwise commits
/// all chunks and returns [`IngestResult::Success`]. An unreadable or
/// unsupported file fails the whole call before anything is written.
pub async fn ingest(
    store: &dyn VectorStore,
    chunking: &ChunkingConfig,
    paths: &[PathBuf],
) -> Result<IngestResult, PipelineError> {
    let documents = load_paths(paths)?;
    let chunks = split_documents(&documents, chunking.chunk_size, chunking.chunk_overlap);

    let existing = store.list_sources().await?;

    let duplicate_sources: BTreeSet<String> = chunks
        .iter()
        .filter(|c| existing.contains(&c.source))
        .map(|c| c.source.clone())
        .collect();

    if !duplicate_sources.is_empty() {
        return Ok(IngestResult::DuplicateRejected { duplicate_sources });
    }

    let chunks_written = store.add_records(&chunks).await?;
    Ok(IngestResult::Success { chunks_written })
}
