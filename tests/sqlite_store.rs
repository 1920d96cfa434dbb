//! Persistence tests for the SQLite-backed store.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use askdocs::embedding::Embedder;
use askdocs::error::PipelineError;
use askdocs::models::Chunk;
use askdocs::store::sqlite::SqliteStore;
use askdocs::store::VectorStore;

/// Embeds every text as a unit vector along an axis picked by its first
/// character, so distinct texts can be told apart by cosine similarity.
struct AxisEmbedder;

#[async_trait]
impl Embedder for AxisEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        Ok(texts
            .iter()
            .map(|t| {
                let axis = (t.bytes().next().unwrap_or(0) as usize) % 3;
                let mut v = vec![0.0f32; 3];
                v[axis] = 1.0;
                v
            })
            .collect())
    }
}

fn chunk(source: &str, text: &str, start_index: usize) -> Chunk {
    Chunk {
        source: source.to_string(),
        text: text.to_string(),
        start_index,
    }
}

#[tokio::test]
async fn open_or_create_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data/askdocs.sqlite");

    let store = SqliteStore::open_or_create(&path, Arc::new(AxisEmbedder))
        .await
        .unwrap();
    assert!(store.list_sources().await.unwrap().is_empty());
    store.close().await;

    // Reopening must not disturb the schema or error out.
    let store = SqliteStore::open_or_create(&path, Arc::new(AxisEmbedder))
        .await
        .unwrap();
    assert!(store.list_sources().await.unwrap().is_empty());
    store.close().await;
}

#[tokio::test]
async fn records_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("askdocs.sqlite");

    let store = SqliteStore::open_or_create(&path, Arc::new(AxisEmbedder))
        .await
        .unwrap();
    let written = store
        .add_records(&[
            chunk("report.txt", "alpha half", 0),
            chunk("report.txt", "alpha rest", 250),
        ])
        .await
        .unwrap();
    assert_eq!(written, 2);
    store.close().await;

    let store = SqliteStore::open_or_create(&path, Arc::new(AxisEmbedder))
        .await
        .unwrap();
    let sources = store.list_sources().await.unwrap();
    assert!(sources.contains("report.txt"));

    // "alpha …" and the query share the same leading byte, so both
    // records come back with similarity 1.0.
    let results = store.similarity_search("anything alike", 10).await.unwrap();
    assert_eq!(results.len(), 2);
    for r in &results {
        assert!((r.score - 1.0).abs() < 1e-6);
        assert_eq!(r.record.source, "report.txt");
    }
    store.close().await;
}

#[tokio::test]
async fn search_ranks_by_descending_similarity_and_truncates() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("askdocs.sqlite");

    let store = SqliteStore::open_or_create(&path, Arc::new(AxisEmbedder))
        .await
        .unwrap();
    store
        .add_records(&[
            chunk("a.txt", "alike text", 0),   // axis of 'a'
            chunk("b.txt", "bother text", 0),  // different axis
            chunk("c.txt", "apart text", 0),   // axis of 'a' again
        ])
        .await
        .unwrap();

    let results = store.similarity_search("axis query", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].score >= results[1].score);
    for r in &results {
        assert!((r.score - 1.0).abs() < 1e-6, "only matching-axis records");
        assert_ne!(r.record.source, "b.txt");
    }
    store.close().await;
}
