// Free-model router: classify, redact, select, then walk the fallback sequence
pub mod backend;
pub mod circuit;
pub mod classify;
pub mod model_router;
pub mod redact;
pub mod selector;
pub mod telemetry;

pub use backend::{ChatBackend, OpenAiCompatBackend};
pub use circuit::{CircuitBreakerConfig, CircuitBreakerStore};
pub use classify::{classify, TaskClass};
pub use model_router::{ModelRouter, RouteOptions, RouteOutcome, DEGRADED_CONTENT, MAX_FALLBACKS};
pub use redact::redact;
pub use selector::{select_models, RouteMode};
pub use telemetry::{ModelHealth, RouterTelemetry};
