//! End-to-end pipeline tests over the in-memory store with deterministic
//! mock embedding and chat capabilities.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use askdocs::answer::answer;
use askdocs::config::{ChunkingConfig, RetrievalConfig};
use askdocs::error::PipelineError;
use askdocs::ingest::ingest;
use askdocs::llm::ChatModel;
use askdocs::models::IngestResult;
use askdocs::store::memory::InMemoryStore;
use askdocs::store::VectorStore;
use askdocs::embedding::Embedder;

/// Embedder that maps any text containing a rule keyword to that rule's
/// fixed vector; unmatched text gets a direction orthogonal to all rules.
struct RuleEmbedder {
    rules: Vec<(&'static str, [f32; 4])>,
}

impl RuleEmbedder {
    fn new(rules: Vec<(&'static str, [f32; 4])>) -> Arc<Self> {
        Arc::new(Self { rules })
    }
}

#[async_trait]
impl Embedder for RuleEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        Ok(texts
            .iter()
            .map(|t| {
                self.rules
                    .iter()
                    .find(|(kw, _)| t.contains(kw))
                    .map(|(_, v)| v.to_vec())
                    .unwrap_or_else(|| vec![0.0, 0.0, 0.0, 1.0])
            })
            .collect())
    }
}

/// Chat model that records every prompt and returns a canned reply.
struct MockChat {
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockChat {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Answer from mock.".to_string())
    }
}

fn chunking() -> ChunkingConfig {
    ChunkingConfig {
        chunk_size: 500,
        chunk_overlap: 250,
    }
}

fn retrieval() -> RetrievalConfig {
    RetrievalConfig {
        top_k: 4,
        similarity_margin: 0.7,
    }
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn sources(set: &BTreeSet<String>) -> Vec<&str> {
    set.iter().map(|s| s.as_str()).collect()
}

#[tokio::test]
async fn ingest_commits_new_batch_and_lists_sources() {
    let tmp = TempDir::new().unwrap();
    let a = write_file(&tmp, "a.txt", "alpha notes");
    let b = write_file(&tmp, "b.txt", "beta notes");

    let store = InMemoryStore::new(RuleEmbedder::new(vec![]));
    let result = ingest(&store, &chunking(), &[a, b]).await.unwrap();

    assert_eq!(result, IngestResult::Success { chunks_written: 2 });
    assert_eq!(store.len(), 2);
    assert_eq!(
        sources(&store.list_sources().await.unwrap()),
        vec!["a.txt", "b.txt"]
    );
}

#[tokio::test]
async fn listed_sources_are_the_union_across_batches() {
    let tmp = TempDir::new().unwrap();
    let a = write_file(&tmp, "a.txt", "alpha");
    let c = write_file(&tmp, "c.txt", "gamma");

    let store = InMemoryStore::new(RuleEmbedder::new(vec![]));
    ingest(&store, &chunking(), &[a]).await.unwrap();
    ingest(&store, &chunking(), &[c]).await.unwrap();

    assert_eq!(
        sources(&store.list_sources().await.unwrap()),
        vec!["a.txt", "c.txt"]
    );
}

#[tokio::test]
async fn reingesting_a_file_is_rejected_and_store_is_unchanged() {
    let tmp = TempDir::new().unwrap();
    // 1000 boundary-free chars: windows [0,500), [250,750), [500,1000).
    let finance = write_file(&tmp, "finance.txt", &"z".repeat(1000));

    let store = InMemoryStore::new(RuleEmbedder::new(vec![]));
    let first = ingest(&store, &chunking(), std::slice::from_ref(&finance))
        .await
        .unwrap();
    assert_eq!(first, IngestResult::Success { chunks_written: 3 });

    let second = ingest(&store, &chunking(), &[finance]).await.unwrap();
    match second {
        IngestResult::DuplicateRejected { duplicate_sources } => {
            assert_eq!(sources(&duplicate_sources), vec!["finance.txt"]);
        }
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
    assert_eq!(store.len(), 3, "rejected batch must not write");
}

#[tokio::test]
async fn batch_with_one_duplicate_rejects_the_new_files_too() {
    let tmp = TempDir::new().unwrap();
    let finance = write_file(&tmp, "finance.txt", &"z".repeat(1000));
    let fresh = write_file(&tmp, "a.txt", "completely new material");

    let store = InMemoryStore::new(RuleEmbedder::new(vec![]));
    ingest(&store, &chunking(), std::slice::from_ref(&finance))
        .await
        .unwrap();
    let before = store.len();

    let result = ingest(&store, &chunking(), &[fresh, finance]).await.unwrap();
    match result {
        IngestResult::DuplicateRejected { duplicate_sources } => {
            // Only the conflicting name is reported, but nothing is written.
            assert_eq!(sources(&duplicate_sources), vec!["finance.txt"]);
        }
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
    assert_eq!(store.len(), before);
    assert!(!store.list_sources().await.unwrap().contains("a.txt"));
}

#[tokio::test]
async fn unreadable_file_fails_before_anything_is_written() {
    let tmp = TempDir::new().unwrap();
    let good = write_file(&tmp, "good.txt", "fine content");
    let bad = write_file(&tmp, "bad.bin", "\x00\x01\x02");

    let store = InMemoryStore::new(RuleEmbedder::new(vec![]));
    let err = ingest(&store, &chunking(), &[good, bad]).await.unwrap_err();
    match err {
        PipelineError::UnsupportedFormat { file, .. } => assert_eq!(file, "bad.bin"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn low_relevance_returns_sentinel_without_calling_llm() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "offtopic.txt", "offtopic material only");

    // cosine([1,0,0,0], [1,1,1,1]) = 0.5, below the 0.7 margin.
    let embedder = RuleEmbedder::new(vec![
        ("budget", [1.0, 0.0, 0.0, 0.0]),
        ("offtopic", [1.0, 1.0, 1.0, 1.0]),
    ]);
    let store = InMemoryStore::new(embedder);
    ingest(&store, &chunking(), &[doc]).await.unwrap();

    let chat = MockChat::new();
    let result = answer(&store, &chat, &retrieval(), "What is the Q3 budget?")
        .await
        .unwrap();

    assert!(result.is_no_context());
    assert!(result.sources.is_empty());
    assert_eq!(chat.call_count(), 0, "LLM must not run without context");
}

#[tokio::test]
async fn score_equal_to_margin_is_discarded() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "edge.txt", "edgecase content");

    // cosine([1,0,0,0], [1,1,1,1]) is exactly 0.5; the cutoff is strict.
    let embedder = RuleEmbedder::new(vec![
        ("question", [1.0, 0.0, 0.0, 0.0]),
        ("edgecase", [1.0, 1.0, 1.0, 1.0]),
    ]);
    let store = InMemoryStore::new(embedder);
    ingest(&store, &chunking(), &[doc]).await.unwrap();

    let chat = MockChat::new();
    let config = RetrievalConfig {
        top_k: 4,
        similarity_margin: 0.5,
    };
    let result = answer(&store, &chat, &config, "question").await.unwrap();
    assert!(result.is_no_context());
}

#[tokio::test]
async fn answer_deduplicates_sources_from_the_same_file() {
    let tmp = TempDir::new().unwrap();
    // Long enough for several chunks, every chunk contains "budget".
    let doc = write_file(&tmp, "budget.csv", &"budget,14000\n".repeat(80));

    let embedder = RuleEmbedder::new(vec![("budget", [1.0, 0.0, 0.0, 0.0])]);
    let store = InMemoryStore::new(embedder);
    let written = match ingest(&store, &chunking(), &[doc]).await.unwrap() {
        IngestResult::Success { chunks_written } => chunks_written,
        other => panic!("expected success, got {other:?}"),
    };
    assert!(written >= 2, "test needs multiple chunks, got {written}");

    let chat = MockChat::new();
    let result = answer(&store, &chat, &retrieval(), "What is the Q3 budget?")
        .await
        .unwrap();

    assert_eq!(result.answer, "Answer from mock.");
    assert_eq!(result.sources, vec!["budget.csv"]);
}

#[tokio::test]
async fn context_is_ordered_by_relevance_not_document_order() {
    let tmp = TempDir::new().unwrap();
    // Ingest the weaker match first so store order differs from rank order.
    let weaker = write_file(&tmp, "mid.txt", "bravo details here");
    let stronger = write_file(&tmp, "hi.txt", "alpha details here");

    let embedder = RuleEmbedder::new(vec![
        ("alpha", [1.0, 0.0, 0.0, 0.0]),
        // cosine vs [1,0,0,0] is 1/sqrt(2) ~= 0.707, above the margin.
        ("bravo", [1.0, 1.0, 0.0, 0.0]),
    ]);
    let store = InMemoryStore::new(embedder);
    ingest(&store, &chunking(), &[weaker, stronger]).await.unwrap();

    let chat = MockChat::new();
    let result = answer(&store, &chat, &retrieval(), "alpha").await.unwrap();

    assert_eq!(result.sources, vec!["hi.txt", "mid.txt"]);

    let prompt = chat.last_prompt();
    let pos_strong = prompt.find("alpha details").expect("stronger chunk in prompt");
    let pos_weak = prompt.find("bravo details").expect("weaker chunk in prompt");
    assert!(pos_strong < pos_weak, "context must follow rank order");
    assert!(prompt.contains("\n\n---\n\n"), "chunks need a visible delimiter");
    assert!(prompt.contains("Question:\nalpha"));
}

#[tokio::test]
async fn llm_failure_surfaces_as_answer_generation_failure() {
    struct FailingChat;

    #[async_trait]
    impl ChatModel for FailingChat {
        async fn generate(&self, _prompt: &str) -> Result<String, PipelineError> {
            Err(PipelineError::AnswerGenerationFailure("upstream 500".into()))
        }
    }

    let tmp = TempDir::new().unwrap();
    let doc = write_file(&tmp, "a.txt", "alpha content");
    let embedder = RuleEmbedder::new(vec![("alpha", [1.0, 0.0, 0.0, 0.0])]);
    let store = InMemoryStore::new(embedder);
    ingest(&store, &chunking(), &[doc]).await.unwrap();

    let err = answer(&store, &FailingChat, &retrieval(), "alpha")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::AnswerGenerationFailure(_)));
}
