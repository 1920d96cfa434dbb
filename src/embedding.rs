//! Embedding capability and vector utilities.
//!
//! [`Embedder`] is the seam between the pipeline and whatever produces
//! vectors: the shipped backend calls the OpenAI embeddings API, tests
//! substitute a deterministic mock. Failures surface as
//! [`PipelineError::EmbeddingFailure`] and are never retried here; any
//! retry policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::error::PipelineError;

/// An embedding backend: text in, fixed-dimension vectors out.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let mut vecs = self.embed(&[text.to_string()]).await?;
        if vecs.is_empty() {
            return Err(PipelineError::EmbeddingFailure(
                "empty embedding response".to_string(),
            ));
        }
        Ok(vecs.swap_remove(0))
    }
}

/// An embedder that always fails. Used by operations that open the store
/// but never embed (listing sources), so they do not require credentials.
pub struct DisabledEmbedder;

#[async_trait]
impl Embedder for DisabledEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        Err(PipelineError::EmbeddingFailure(
            "embedding is not available for this operation".to_string(),
        ))
    }
}

/// Embedding provider backed by the OpenAI `POST /v1/embeddings` endpoint.
///
/// Reads `OPENAI_API_KEY` from the environment at construction time.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, PipelineError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            PipelineError::EmbeddingFailure("OPENAI_API_KEY environment variable not set".into())
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::EmbeddingFailure(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::EmbeddingFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::EmbeddingFailure(format!(
                "OpenAI API error {status}: {detail}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::EmbeddingFailure(e.to_string()))?;
        parse_embeddings(&json)
    }
}

fn parse_embeddings(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, PipelineError> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| PipelineError::EmbeddingFailure("response missing data array".into()))?;

    let mut embeddings = Vec::with_capacity(data.len());
    for item in data {
        let values = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| {
                PipelineError::EmbeddingFailure("response item missing embedding".into())
            })?;
        embeddings.push(
            values
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect(),
        );
    }
    Ok(embeddings)
}

/// Encode a float vector as little-endian f32 bytes for BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB produced by [`vec_to_blob`].
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity between two vectors, in `[-1.0, 1.0]`.
///
/// Returns `0.0` for empty or mismatched-length inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_roundtrip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001];
        assert_eq!(blob_to_vec(&vec_to_blob(&vec)), vec);
    }

    #[test]
    fn cosine_identical_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn parse_embeddings_extracts_vectors_in_order() {
        let json = serde_json::json!({
            "data": [
                { "embedding": [0.1, 0.2] },
                { "embedding": [0.3, 0.4] }
            ]
        });
        let vecs = parse_embeddings(&json).unwrap();
        assert_eq!(vecs.len(), 2);
        assert!((vecs[1][0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn parse_embeddings_rejects_malformed_response() {
        let json = serde_json::json!({ "error": "boom" });
        assert!(parse_embeddings(&json).is_err());
    }
}
