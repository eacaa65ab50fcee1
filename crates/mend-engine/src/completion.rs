//! Generative-completion boundary used by the model-heal sub-stage.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion reply has no message content")]
    EmptyReply,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit a prompt and return the raw reply text. Callers extract any
    /// JSON payload themselves.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Client for an Ollama-compatible chat endpoint on a local host.
pub struct HttpCompletionClient {
    host: String,
    model: String,
    temperature: f64,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

impl HttpCompletionClient {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            // Low temperature keeps proposals parseable and repeatable.
            temperature: 0.1,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
            "options": {"temperature": self.temperature},
        });

        let response = self
            .http
            .post(format!("{}/api/chat", self.host.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response.json().await?;
        if parsed.message.content.is_empty() {
            return Err(CompletionError::EmptyReply);
        }
        Ok(parsed.message.content)
    }
}
