// Outer backend families and their enabled-aware fallback composition
pub mod chain;
pub mod factory;
pub mod gateway;
pub mod mock;
pub mod router;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::router::{RouterTelemetry, TaskClass};

pub use chain::FallbackProviderChain;
pub use factory::{build_provider_stack, build_provider_stack_with_registry, ProviderStack};
pub use gateway::GatewayProvider;
pub use mock::MockProvider;
pub use router::RouterProvider;

/// Assistant feature that produced the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantTaskType {
    #[default]
    Chat,
    Summarize,
    Code,
    Draft,
}

impl AssistantTaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantTaskType::Chat => "chat",
            AssistantTaskType::Summarize => "summarize",
            AssistantTaskType::Code => "code",
            AssistantTaskType::Draft => "draft",
        }
    }

    /// Task class implied by the feature itself, if any
    pub fn task_class_hint(&self) -> Option<TaskClass> {
        match self {
            AssistantTaskType::Summarize => Some(TaskClass::Summary),
            AssistantTaskType::Code => Some(TaskClass::Coding),
            AssistantTaskType::Chat | AssistantTaskType::Draft => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantTask {
    #[serde(rename = "type", default)]
    pub task_type: AssistantTaskType,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl AssistantTask {
    pub fn new(task_type: AssistantTaskType, prompt: impl Into<String>) -> Self {
        Self {
            task_type,
            prompt: prompt.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Context (when present) followed by the prompt, as sent to a model.
    pub fn full_prompt(&self) -> String {
        match self.context.as_deref().map(str::trim) {
            Some(context) if !context.is_empty() => format!("{}\n\n{}", context, self.prompt),
            _ => self.prompt.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub provider: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_telemetry: Option<RouterTelemetry>,
}

/// A backend family that can serve assistant tasks.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> &str;

    /// Whether the adapter has what it needs (credentials etc.) to be tried
    fn enabled(&self) -> bool;

    async fn generate(
        &self,
        task: &AssistantTask,
        cancel: &CancellationToken,
    ) -> Result<GenerateResult>;
}
