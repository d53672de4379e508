//! Per-model failure isolation.
//!
//! A sliding-window failure counter with a fixed timed lockout. A model whose circuit
//! is open is skipped by selection until the cooldown elapses, after which its entry is
//! dropped and it is immediately eligible again (there is no half-open probe).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failures further apart than this do not accumulate
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

fn default_window_secs() -> u64 {
    120
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_secs() -> u64 {
    600
}

#[derive(Debug, Clone, Copy)]
struct CircuitState {
    failures: u32,
    last_failure_at: Instant,
    open_until: Option<Instant>,
}

/// Point-in-time view of one model's circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CircuitSnapshot {
    pub open: bool,
    pub failures: u32,
    pub cooldown_remaining: Duration,
}

/// Shared circuit state for every model, keyed by model id.
///
/// Counts may drift under concurrent updates; each entry is always written whole.
#[derive(Debug, Default)]
pub struct CircuitBreakerStore {
    config: CircuitBreakerConfig,
    states: Mutex<FxHashMap<String, CircuitState>>,
}

impl CircuitBreakerStore {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            states: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<String, CircuitState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_open(&self, model_id: &str) -> bool {
        self.is_open_at(model_id, Instant::now())
    }

    /// True while the lockout is in force. An elapsed lockout is cleared.
    pub fn is_open_at(&self, model_id: &str, now: Instant) -> bool {
        let mut states = self.lock();
        let Some(open_until) = states.get(model_id).and_then(|s| s.open_until) else {
            return false;
        };

        if open_until > now {
            true
        } else {
            states.remove(model_id);
            debug!(model = model_id, "circuit cooldown elapsed, closing");
            false
        }
    }

    pub fn record_success(&self, model_id: &str) {
        if self.lock().remove(model_id).is_some() {
            debug!(model = model_id, "circuit reset after success");
        }
    }

    pub fn record_failure(&self, model_id: &str) -> bool {
        self.record_failure_at(model_id, Instant::now())
    }

    /// Count a failure. Returns true when this failure opened the circuit.
    pub fn record_failure_at(&self, model_id: &str, now: Instant) -> bool {
        let mut states = self.lock();
        let state = states
            .entry(model_id.to_string())
            .or_insert(CircuitState {
                failures: 0,
                last_failure_at: now,
                open_until: None,
            });

        if now.saturating_duration_since(state.last_failure_at) > self.config.window() {
            state.failures = 0;
        }
        state.failures += 1;
        state.last_failure_at = now;

        if state.failures >= self.config.failure_threshold {
            let already_open = state.open_until.is_some_and(|until| until > now);
            state.open_until = Some(now.checked_add(self.config.cooldown()).unwrap_or(now));
            if !already_open {
                warn!(
                    model = model_id,
                    failures = state.failures,
                    cooldown_secs = self.config.cooldown_secs,
                    "circuit opened"
                );
                return true;
            }
        }

        false
    }

    /// Read-only view used for health reporting. Does not clear elapsed entries.
    pub fn snapshot_at(&self, model_id: &str, now: Instant) -> CircuitSnapshot {
        let states = self.lock();
        match states.get(model_id) {
            None => CircuitSnapshot::default(),
            Some(state) => match state.open_until {
                Some(until) if until > now => CircuitSnapshot {
                    open: true,
                    failures: state.failures,
                    cooldown_remaining: until - now,
                },
                // Elapsed lockout: already closed in effect
                Some(_) => CircuitSnapshot::default(),
                None => CircuitSnapshot {
                    open: false,
                    failures: state.failures,
                    cooldown_remaining: Duration::ZERO,
                },
            },
        }
    }

    pub fn reset(&self) {
        self.lock().clear();
    }
}
