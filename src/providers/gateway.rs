use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{RelayError, Result};
use crate::providers::{AssistantTask, GenerateResult, ProviderAdapter};
use crate::router::{redact, ChatBackend};

pub const GATEWAY_PROVIDER_ID: &str = "gateway";

/// A single fixed model behind a hosted gateway. No per-model fallback.
pub struct GatewayProvider {
    backend: Arc<dyn ChatBackend>,
    model: String,
    enabled: bool,
}

impl GatewayProvider {
    pub fn new(backend: Arc<dyn ChatBackend>, model: impl Into<String>, enabled: bool) -> Self {
        Self {
            backend,
            model: model.into(),
            enabled,
        }
    }
}

#[async_trait]
impl ProviderAdapter for GatewayProvider {
    fn id(&self) -> &str {
        GATEWAY_PROVIDER_ID
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn generate(
        &self,
        task: &AssistantTask,
        cancel: &CancellationToken,
    ) -> Result<GenerateResult> {
        let prompt = redact(&task.full_prompt());
        debug!(model = %self.model, task_type = task.task_type.as_str(), "gateway request");

        let content = self
            .backend
            .call_model(&self.model, &prompt, cancel)
            .await
            .map_err(|e| RelayError::Provider(format!("gateway model {}: {}", self.model, e)))?;

        Ok(GenerateResult {
            provider: GATEWAY_PROVIDER_ID.to_string(),
            content,
            router_telemetry: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::providers::AssistantTaskType;
    use std::sync::Mutex;

    struct RecordingBackend {
        calls: Mutex<Vec<(String, String)>>,
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl ChatBackend for RecordingBackend {
        async fn call_model(
            &self,
            model_id: &str,
            prompt: &str,
            _cancel: &CancellationToken,
        ) -> std::result::Result<String, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((model_id.to_string(), prompt.to_string()));
            self.reply
                .map(str::to_string)
                .ok_or(BackendError::Timeout(15_000))
        }
    }

    #[tokio::test]
    async fn test_uses_fixed_model_and_redacts() {
        let backend = Arc::new(RecordingBackend {
            calls: Mutex::new(Vec::new()),
            reply: Some("done"),
        });
        let provider = GatewayProvider::new(backend.clone(), "gpt-4o-mini", true);
        let task = AssistantTask::new(AssistantTaskType::Draft, "write to jane@corp.io");

        let result = provider.generate(&task, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.provider, "gateway");
        assert_eq!(result.content, "done");
        assert!(result.router_telemetry.is_none());
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].0, "gpt-4o-mini");
        assert_eq!(calls[0].1, "write to [EMAIL]");
    }

    #[tokio::test]
    async fn test_backend_error_becomes_provider_error() {
        let backend = Arc::new(RecordingBackend {
            calls: Mutex::new(Vec::new()),
            reply: None,
        });
        let provider = GatewayProvider::new(backend, "m", true);
        let task = AssistantTask::new(AssistantTaskType::Chat, "hi");

        let err = provider
            .generate(&task, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Provider(_)));
        assert!(err.to_string().contains("timed out"));
    }
}
