use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::models::ModelRegistry;
use crate::router::backend::ChatBackend;
use crate::router::circuit::CircuitBreakerStore;
use crate::router::classify::{classify, TaskClass};
use crate::router::redact::redact;
use crate::router::selector::{select_models, RouteMode};
use crate::router::telemetry::{self, duration_ms, ModelHealth, RouterTelemetry};

/// Extra attempts after the first; a request touches at most `MAX_FALLBACKS + 1` models.
pub const MAX_FALLBACKS: usize = 2;

/// Returned when no candidate produced content.
pub const DEGRADED_CONTENT: &str =
    "All AI models are temporarily unavailable. Please try again in a few minutes.";

const NO_MODEL: &str = "none";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    pub mode: RouteMode,
    /// Skip classification when the caller already knows the class
    pub task_class: Option<TaskClass>,
}

impl RouteOptions {
    pub fn new(mode: RouteMode) -> Self {
        Self {
            mode,
            task_class: None,
        }
    }

    pub fn with_task_class(mut self, task_class: TaskClass) -> Self {
        self.task_class = Some(task_class);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub content: String,
    pub telemetry: RouterTelemetry,
}

/// Fallback executor over the free-model registry.
///
/// `route_request` never fails: total exhaustion is reported through
/// `telemetry.success == false` and [`DEGRADED_CONTENT`].
pub struct ModelRouter {
    registry: Arc<ModelRegistry>,
    circuits: Arc<CircuitBreakerStore>,
    backend: Arc<dyn ChatBackend>,
}

impl ModelRouter {
    pub fn new(
        registry: Arc<ModelRegistry>,
        circuits: Arc<CircuitBreakerStore>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            registry,
            circuits,
            backend,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn circuits(&self) -> &CircuitBreakerStore {
        &self.circuits
    }

    pub fn model_health(&self) -> Vec<ModelHealth> {
        telemetry::model_health(&self.registry, &self.circuits)
    }

    pub async fn route_request(
        &self,
        prompt: &str,
        options: RouteOptions,
        cancel: &CancellationToken,
    ) -> RouteOutcome {
        let started = Instant::now();
        let task_class = options.task_class.unwrap_or_else(|| classify(prompt));
        let sanitized = redact(prompt);

        let candidates = select_models(&self.registry, &self.circuits, task_class, options.mode);
        debug!(
            task_class = %task_class,
            mode = %options.mode,
            candidates = candidates.len(),
            "selected candidates"
        );
        if candidates.is_empty() {
            warn!(task_class = %task_class, "no eligible models, every circuit open or unmatched");
        }

        let mut fallback_chain: Vec<String> = Vec::with_capacity(MAX_FALLBACKS + 1);

        for model_id in candidates.into_iter().take(MAX_FALLBACKS + 1) {
            if cancel.is_cancelled() {
                debug!("request cancelled, abandoning fallback sequence");
                break;
            }
            if fallback_chain.contains(&model_id) {
                continue;
            }
            fallback_chain.push(model_id.clone());

            match self.backend.call_model(&model_id, &sanitized, cancel).await {
                Ok(content) => {
                    self.circuits.record_success(&model_id);
                    let telemetry = RouterTelemetry {
                        model_used: model_id,
                        latency_ms: duration_ms(started.elapsed()),
                        success: true,
                        fallback_chain,
                        task_class,
                    };
                    telemetry.record();
                    return RouteOutcome { content, telemetry };
                }
                Err(e) if !e.is_backend_fault() => {
                    debug!(model = %model_id, "attempt abandoned: {}", e);
                    break;
                }
                Err(e) => {
                    warn!(model = %model_id, error = %e, "model attempt failed, falling back");
                    self.circuits.record_failure(&model_id);
                }
            }
        }

        let telemetry = RouterTelemetry {
            model_used: NO_MODEL.to_string(),
            latency_ms: duration_ms(started.elapsed()),
            success: false,
            fallback_chain,
            task_class,
        };
        telemetry.record();

        RouteOutcome {
            content: DEGRADED_CONTENT.to_string(),
            telemetry,
        }
    }
}
