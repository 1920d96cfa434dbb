//! Language-model capability.
//!
//! [`ChatModel`] is the single seam the answer pipeline needs: a prompt in,
//! generated text out. The shipped backend calls the OpenAI chat-completions
//! API; tests substitute a canned implementation. A failed invocation is
//! terminal for the request; there is no retry and no fallback.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::PipelineError;

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Chat model backed by the OpenAI `POST /v1/chat/completions` endpoint.
///
/// Reads `OPENAI_API_KEY` from the environment at construction time.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(config: &LlmConfig) -> Result<Self, PipelineError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            PipelineError::AnswerGenerationFailure(
                "OPENAI_API_KEY environment variable not set".into(),
            )
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::AnswerGenerationFailure(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::AnswerGenerationFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::AnswerGenerationFailure(format!(
                "OpenAI API error {status}: {detail}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::AnswerGenerationFailure(e.to_string()))?;
        extract_message(&json)
    }
}

fn extract_message(json: &serde_json::Value) -> Result<String, PipelineError> {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            PipelineError::AnswerGenerationFailure("response missing message content".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_message_reads_first_choice() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "The Q3 budget is 14k." } }
            ]
        });
        assert_eq!(extract_message(&json).unwrap(), "The Q3 budget is 14k.");
    }

    #[test]
    fn extract_message_rejects_empty_choices() {
        let json = serde_json::json!({ "choices": [] });
        assert!(extract_message(&json).is_err());
    }
}
