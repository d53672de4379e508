use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::models::ModelRegistry;
use crate::router::circuit::CircuitBreakerStore;
use crate::router::classify::TaskClass;

/// Per-request record of how the router served a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterTelemetry {
    pub model_used: String,
    pub latency_ms: u64,
    pub success: bool,
    /// Models attempted, in order
    pub fallback_chain: Vec<String>,
    pub task_class: TaskClass,
}

impl RouterTelemetry {
    /// Emit the request summary as one structured log event.
    pub fn record(&self) {
        info!(
            model_used = %self.model_used,
            latency_ms = self.latency_ms,
            success = self.success,
            fallback_chain = %self.fallback_chain.join(" -> "),
            task_class = %self.task_class,
            "routed request"
        );
    }
}

/// Health row shown in the admin view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHealth {
    pub id: String,
    pub circuit_open: bool,
    pub failures: u32,
    pub cooldown_remaining_ms: u64,
}

/// Health of every registered model, including ones that never failed.
pub fn model_health(registry: &ModelRegistry, circuits: &CircuitBreakerStore) -> Vec<ModelHealth> {
    model_health_at(registry, circuits, Instant::now())
}

pub fn model_health_at(
    registry: &ModelRegistry,
    circuits: &CircuitBreakerStore,
    now: Instant,
) -> Vec<ModelHealth> {
    registry
        .models()
        .iter()
        .map(|model| {
            let snapshot = circuits.snapshot_at(&model.id, now);
            ModelHealth {
                id: model.id.clone(),
                circuit_open: snapshot.open,
                failures: snapshot.failures,
                cooldown_remaining_ms: duration_ms(snapshot.cooldown_remaining),
            }
        })
        .collect()
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::FreeModel;
    use crate::router::circuit::CircuitBreakerConfig;

    fn registry() -> ModelRegistry {
        ModelRegistry::new(vec![
            FreeModel::new("a", &[TaskClass::Coding], 1),
            FreeModel::new("b", &[TaskClass::General], 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_untouched_models_reported_closed() {
        let circuits = CircuitBreakerStore::new(CircuitBreakerConfig::default());
        let health = model_health(&registry(), &circuits);

        assert_eq!(health.len(), 2);
        for row in &health {
            assert!(!row.circuit_open);
            assert_eq!(row.failures, 0);
            assert_eq!(row.cooldown_remaining_ms, 0);
        }
    }

    #[test]
    fn test_open_circuit_reported() {
        let circuits = CircuitBreakerStore::new(CircuitBreakerConfig::default());
        let t0 = Instant::now();
        for _ in 0..3 {
            circuits.record_failure_at("a", t0);
        }
        circuits.record_failure_at("b", t0);

        let health = model_health_at(&registry(), &circuits, t0 + Duration::from_secs(60));

        assert_eq!(
            health[0],
            ModelHealth {
                id: "a".to_string(),
                circuit_open: true,
                failures: 3,
                cooldown_remaining_ms: 540_000,
            }
        );
        assert!(!health[1].circuit_open);
        assert_eq!(health[1].failures, 1);
    }

    #[test]
    fn test_health_is_idempotent() {
        let circuits = CircuitBreakerStore::new(CircuitBreakerConfig::default());
        let t0 = Instant::now();
        circuits.record_failure_at("a", t0);

        let first = model_health_at(&registry(), &circuits, t0);
        let second = model_health_at(&registry(), &circuits, t0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_telemetry_serializes_camel_case() {
        let telemetry = RouterTelemetry {
            model_used: "b".to_string(),
            latency_ms: 12,
            success: true,
            fallback_chain: vec!["a".to_string(), "b".to_string()],
            task_class: TaskClass::Coding,
        };
        let json = serde_json::to_value(&telemetry).unwrap();
        assert_eq!(json["modelUsed"], "b");
        assert_eq!(json["fallbackChain"][1], "b");
        assert_eq!(json["taskClass"], "coding");
    }
}
