//! Retrieval-augmented answerer: question → relevant chunks → grounded
//! LLM answer with cited sources.
//!
//! The similarity margin is a hard cutoff, not a re-rank: a result at or
//! below the margin is discarded no matter how it ranked. Surviving
//! chunks are concatenated in descending relevance order (not document
//! order) to form the grounding context.

use crate::config::RetrievalConfig;
use crate::error::PipelineError;
use crate::llm::ChatModel;
use crate::models::{AnswerResult, RelevanceResult};
use crate::store::VectorStore;

/// Separator between chunks in the grounding context.
const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Answer `question` from the store's indexed chunks.
///
/// Returns the no-context sentinel (not an error) when nothing clears the
/// similarity margin. An LLM failure surfaces as
/// [`PipelineError::AnswerGenerationFailure`] and is not retried.
pub async fn answer(
    store: &dyn VectorStore,
    llm: &dyn ChatModel,
    retrieval: &RetrievalConfig,
    question: &str,
) -> Result<AnswerResult, PipelineError> {
    let results = store.similarity_search(question, retrieval.top_k).await?;

    let surviving: Vec<RelevanceResult> = results
        .into_iter()
        .filter(|r| r.score > retrieval.similarity_margin)
        .collect();

    if surviving.is_empty() {
        return Ok(AnswerResult::no_context());
    }

    let context = surviving
        .iter()
        .map(|r| r.record.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER);

    let prompt = compose_prompt(&context, question);
    let answer = llm.generate(&prompt).await?;
    let sources = dedup_sources(&surviving);

    Ok(AnswerResult { answer, sources })
}

fn compose_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful internal analytics assistant specialized in Finance \
         and Project Management.\n\
         Answer the given question using only the provided context. And only \
         answer the relevant question.\n\n\
         Context:\n{context}\n\n\
         Question:\n{question}\n"
    )
}

/// Unique sources in first-occurrence order over the ranked results.
fn dedup_sources(results: &[RelevanceResult]) -> Vec<String> {
    let mut seen = Vec::new();
    for r in results {
        if !seen.contains(&r.record.source) {
            seen.push(r.record.source.clone());
        }
    }
    seen
}

/// Render an [`AnswerResult`] for display: answer text followed by a
/// "Sources Utilized" bullet list. The no-context sentinel renders as its
/// guidance text alone.
pub fn render_answer(result: &AnswerResult) -> String {
    if result.is_no_context() {
        return result.answer.clone();
    }
    let sources_text = if result.sources.is_empty() {
        "No sources available".to_string()
    } else {
        result
            .sources
            .iter()
            .map(|s| format!("    • {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{}\n\nSources Utilized:\n{}", result.answer, sources_text)
}
