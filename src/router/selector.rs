use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::models::{FreeModel, ModelRegistry};
use crate::router::circuit::CircuitBreakerStore;
use crate::router::classify::TaskClass;

/// Candidates kept in `fast` mode.
pub const FAST_MODE_CANDIDATES: usize = 3;

/// How wide the candidate list is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    #[default]
    Fast,
    Best,
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMode::Fast => f.write_str("fast"),
            RouteMode::Best => f.write_str("best"),
        }
    }
}

impl std::str::FromStr for RouteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(RouteMode::Fast),
            "best" => Ok(RouteMode::Best),
            other => Err(format!("unknown route mode '{}' (expected fast or best)", other)),
        }
    }
}

/// Models suited to `task_class` whose circuit is closed, lowest priority value first.
pub fn select_models(
    registry: &ModelRegistry,
    circuits: &CircuitBreakerStore,
    task_class: TaskClass,
    mode: RouteMode,
) -> Vec<String> {
    let mut candidates: Vec<&FreeModel> = registry
        .models()
        .iter()
        .filter(|m| m.supports(task_class))
        .filter(|m| !circuits.is_open(&m.id))
        .collect();

    // stable: registry order breaks priority ties
    candidates.sort_by_key(|m| m.priority);

    if mode == RouteMode::Fast {
        candidates.truncate(FAST_MODE_CANDIDATES);
    }

    candidates.into_iter().map(|m| m.id.clone()).collect()
}
