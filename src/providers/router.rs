use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::{RelayError, Result};
use crate::providers::{AssistantTask, GenerateResult, ProviderAdapter};
use crate::router::{ModelRouter, RouteMode, RouteOptions};

pub const ROUTER_PROVIDER_ID: &str = "router";

/// Serves tasks through the free-model fallback router.
///
/// Exhaustion of every candidate is surfaced as an error so an enclosing
/// [`FallbackProviderChain`](crate::providers::FallbackProviderChain) can move on.
pub struct RouterProvider {
    router: Arc<ModelRouter>,
    mode: RouteMode,
    enabled: bool,
}

impl RouterProvider {
    pub fn new(router: Arc<ModelRouter>, mode: RouteMode, enabled: bool) -> Self {
        Self {
            router,
            mode,
            enabled,
        }
    }
}

#[async_trait]
impl ProviderAdapter for RouterProvider {
    fn id(&self) -> &str {
        ROUTER_PROVIDER_ID
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn generate(
        &self,
        task: &AssistantTask,
        cancel: &CancellationToken,
    ) -> Result<GenerateResult> {
        let mut options = RouteOptions::new(self.mode);
        if let Some(task_class) = task.task_type.task_class_hint() {
            options = options.with_task_class(task_class);
        }

        let outcome = self
            .router
            .route_request(&task.full_prompt(), options, cancel)
            .await;

        if !outcome.telemetry.success {
            return Err(RelayError::Provider(format!(
                "every free model failed (tried: {})",
                if outcome.telemetry.fallback_chain.is_empty() {
                    "none".to_string()
                } else {
                    outcome.telemetry.fallback_chain.join(", ")
                }
            )));
        }

        Ok(GenerateResult {
            provider: ROUTER_PROVIDER_ID.to_string(),
            content: outcome.content,
            router_telemetry: Some(outcome.telemetry),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{FreeModel, ModelRegistry};
    use crate::error::BackendError;
    use crate::providers::AssistantTaskType;
    use crate::router::{ChatBackend, CircuitBreakerConfig, CircuitBreakerStore, TaskClass};
    use std::sync::Mutex;

    struct EchoModelBackend {
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatBackend for EchoModelBackend {
        async fn call_model(
            &self,
            model_id: &str,
            prompt: &str,
            _cancel: &CancellationToken,
        ) -> std::result::Result<String, BackendError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(BackendError::EmptyContent)
            } else {
                Ok(format!("{} answered", model_id))
            }
        }
    }

    fn provider(fail: bool) -> (RouterProvider, Arc<EchoModelBackend>) {
        let backend = Arc::new(EchoModelBackend {
            fail,
            seen: Mutex::new(Vec::new()),
        });
        let registry = ModelRegistry::new(vec![
            FreeModel::new("coder", &[TaskClass::Coding], 1),
            FreeModel::new("writer", &[TaskClass::Summary, TaskClass::General], 2),
        ])
        .unwrap();
        let router = ModelRouter::new(
            Arc::new(registry),
            Arc::new(CircuitBreakerStore::new(CircuitBreakerConfig::default())),
            backend.clone(),
        );
        (RouterProvider::new(Arc::new(router), RouteMode::Fast, true), backend)
    }

    #[tokio::test]
    async fn test_task_type_hint_drives_selection() {
        let (provider, _) = provider(false);
        // Prompt alone reads as general; the feature says coding
        let task = AssistantTask::new(AssistantTaskType::Code, "make it faster");

        let result = provider.generate(&task, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.provider, "router");
        assert_eq!(result.content, "coder answered");
        let telemetry = result.router_telemetry.unwrap();
        assert_eq!(telemetry.task_class, TaskClass::Coding);
    }

    #[tokio::test]
    async fn test_context_is_sent_with_prompt() {
        let (provider, backend) = provider(false);
        let task = AssistantTask::new(AssistantTaskType::Chat, "thoughts?").with_context("Notes");

        provider.generate(&task, &CancellationToken::new()).await.unwrap();

        assert_eq!(backend.seen.lock().unwrap()[0], "Notes\n\nthoughts?");
    }

    #[tokio::test]
    async fn test_exhaustion_is_an_error() {
        let (provider, _) = provider(true);
        let task = AssistantTask::new(AssistantTaskType::Chat, "hello");

        let err = provider
            .generate(&task, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("writer"));
    }
}
