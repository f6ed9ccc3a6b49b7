//! OpenAI-compatible HTTP backend
//!
//! Speaks the chat-completions wire format: the role instruction travels as
//! the system message, the request as the user message. Anything exposing
//! this format (hosted or local) works by pointing `endpoint` at it.

use crate::backend::{GenerationBackend, Role};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Backend configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API credential
    pub api_key: String,
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// Model identifier
    pub model: String,
}

impl OpenAiConfig {
    /// Configuration with default endpoint and model
    #[inline]
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// With a custom endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// With a custom model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions backend
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a backend from configuration
    #[inline]
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Configured model identifier
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn generate(&self, role: &Role, request: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &role.instruction,
                },
                WireMessage {
                    role: "user",
                    content: request,
                },
            ],
        };

        tracing::debug!(role = %role.name, model = %self.config.model, "dispatching generation request");

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Backend(format!("{status}: {detail}")));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_overrides() {
        let config = OpenAiConfig::new("key")
            .with_endpoint("http://localhost:8080/v1/chat/completions")
            .with_model("local-model");
        assert_eq!(config.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.model, "local-model");
    }

    #[test]
    fn request_wire_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                WireMessage {
                    role: "system",
                    content: "You review models.",
                },
                WireMessage {
                    role: "user",
                    content: "Review this.",
                },
            ],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Review this.");
    }

    #[test]
    fn response_missing_content_is_empty() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{}}]}"#).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        assert!(content.is_none());
    }
}
