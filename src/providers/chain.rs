use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::providers::{AssistantTask, GenerateResult, ProviderAdapter};

/// Try `primary`, then `fallback`. The chain is itself an adapter, so chains nest.
pub struct FallbackProviderChain {
    id: String,
    primary: Arc<dyn ProviderAdapter>,
    fallback: Arc<dyn ProviderAdapter>,
}

impl FallbackProviderChain {
    pub fn new(primary: Arc<dyn ProviderAdapter>, fallback: Arc<dyn ProviderAdapter>) -> Self {
        let id = format!("{}>{}", primary.id(), fallback.id());
        Self {
            id,
            primary,
            fallback,
        }
    }
}

#[async_trait]
impl ProviderAdapter for FallbackProviderChain {
    fn id(&self) -> &str {
        &self.id
    }

    fn enabled(&self) -> bool {
        self.primary.enabled() || self.fallback.enabled()
    }

    async fn generate(
        &self,
        task: &AssistantTask,
        cancel: &CancellationToken,
    ) -> Result<GenerateResult> {
        let mut primary_error = None;

        if self.primary.enabled() {
            match self.primary.generate(task, cancel).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!(
                        primary = self.primary.id(),
                        fallback = self.fallback.id(),
                        error = %e,
                        "primary provider failed, falling back"
                    );
                    primary_error = Some(e);
                }
            }
        } else {
            debug!(primary = self.primary.id(), "primary provider disabled, skipping");
        }

        if cancel.is_cancelled() {
            return Err(RelayError::Cancelled);
        }

        if self.fallback.enabled() {
            return self.fallback.generate(task, cancel).await;
        }

        Err(RelayError::ProviderUnavailable(match primary_error {
            Some(e) => format!(
                "'{}' failed ({}) and '{}' is disabled",
                self.primary.id(),
                e,
                self.fallback.id()
            ),
            None => format!(
                "both '{}' and '{}' are disabled",
                self.primary.id(),
                self.fallback.id()
            ),
        }))
    }
}
