//! Groq chat-completion provider.
//!
//! Groq exposes an OpenAI-compatible chat completions endpoint; the wire
//! structs here mirror that schema. Sampling is fixed: bounded output
//! length and near-deterministic temperature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationError, GenerationProvider, GenerationResult};
use crate::models::ChatTurn;

/// Chat completions endpoint.
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Model used for paper discussion.
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Upper bound on generated tokens per reply.
pub const MAX_TOKENS: u32 = 500;

/// Sampling temperature; low so answers about a fixed paper stay stable.
pub const TEMPERATURE: f32 = 0.2;

/// Groq-backed generation provider.
pub struct GroqProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GroqProvider {
    /// Create a provider with the default model.
    ///
    /// # Errors
    /// Returns `GenerationError::ConfigError` if the API key is empty.
    pub fn new(api_key: String) -> GenerationResult<Self> {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    /// Create a provider for a specific model.
    pub fn with_model(api_key: String, model: String) -> GenerationResult<Self> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::ConfigError(
                "Groq API key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl GenerationProvider for GroqProvider {
    async fn complete(&self, messages: &[ChatTurn]) -> GenerationResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(GROQ_API_URL)
            .bearer_auth(self.api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(GenerationError::ApiError(format!(
                "Groq returned {status}: {text}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                GenerationError::InvalidResponse("response contained no choices".to_string())
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            GroqProvider::new("  ".to_string()),
            Err(GenerationError::ConfigError(_))
        ));
    }

    #[test]
    fn test_request_serializes_openai_shape() {
        let messages = vec![
            ChatTurn::system("discuss the paper"),
            ChatTurn::user("what is it about?"),
        ];
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_response_parses_first_choice() {
        let raw = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "It introduces attention."}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content,
            "It introduces attention."
        );
    }
}
