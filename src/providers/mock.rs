use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::providers::{AssistantTask, AssistantTaskType, GenerateResult, ProviderAdapter};

pub const MOCK_PROVIDER_ID: &str = "mock";

const PREVIEW_CHARS: usize = 80;

/// Static templater used when no real backend is configured. Always enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProvider;

impl MockProvider {
    fn render(task: &AssistantTask) -> String {
        let preview: String = task.prompt.chars().take(PREVIEW_CHARS).collect();
        let lead = match task.task_type {
            AssistantTaskType::Summarize => "Summary unavailable offline. Key text received",
            AssistantTaskType::Code => "Code assistance is offline. Request received",
            AssistantTaskType::Draft => "Drafting is offline. Brief received",
            AssistantTaskType::Chat => "The assistant is running in offline mode. You said",
        };
        format!("{}: \"{}\"", lead, preview.trim())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn id(&self) -> &str {
        MOCK_PROVIDER_ID
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        task: &AssistantTask,
        _cancel: &CancellationToken,
    ) -> Result<GenerateResult> {
        Ok(GenerateResult {
            provider: MOCK_PROVIDER_ID.to_string(),
            content: Self::render(task),
            router_telemetry: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_template() {
        let task = AssistantTask::new(AssistantTaskType::Chat, "hello");
        let result = MockProvider
            .generate(&task, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.provider, "mock");
        assert_eq!(
            result.content,
            "The assistant is running in offline mode. You said: \"hello\""
        );
    }

    #[test]
    fn test_preview_is_bounded() {
        let task = AssistantTask::new(AssistantTaskType::Summarize, "x".repeat(500));
        let content = MockProvider::render(&task);
        assert!(content.len() < 200);
    }
}
