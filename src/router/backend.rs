use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::BackendError;
use crate::router::telemetry::duration_ms;

const ERROR_BODY_LIMIT: usize = 200;

/// One chat-completion call against one model. Implementations must not retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn call_model(
        &self,
        model_id: &str,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Backend speaking the OpenAI chat-completions wire format (OpenRouter, hosted gateways).
#[derive(Debug, Clone)]
pub struct OpenAiCompatBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiCompatBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_tokens: 1024,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, model_id: &str, prompt: &str) -> Result<String, BackendError> {
        let body = ChatCompletionRequest {
            model: model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("X-Title", "relay")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&text, ERROR_BODY_LIMIT),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(BackendError::EmptyContent)
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatBackend {
    async fn call_model(
        &self,
        model_id: &str,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, BackendError> {
        debug!(model = model_id, endpoint = %self.endpoint(), "calling backend");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(BackendError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.send(model_id, prompt)) => {
                result.unwrap_or(Err(BackendError::Timeout(duration_ms(self.timeout))))
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}
