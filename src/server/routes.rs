use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::RelayError;
use crate::providers::{AssistantTask, GenerateResult};
use crate::router::ModelHealth;
use crate::server::AppState;

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Serve one assistant task through the configured provider chain
pub async fn generate(
    State(state): State<AppState>,
    Json(task): Json<AssistantTask>,
) -> Result<Json<GenerateResult>, ApiError> {
    if task.prompt.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "prompt must not be empty"));
    }

    // Dropped with the handler future, so a client disconnect aborts in-flight backend calls
    let cancel = CancellationToken::new();
    let _disconnect_guard = cancel.clone().drop_guard();

    info!(task_type = task.task_type.as_str(), chain = state.chain.id(), "generate");

    match state.chain.generate(&task, &cancel).await {
        Ok(result) => Ok(Json(result)),
        Err(RelayError::Cancelled) => Err(api_error(
            StatusCode::REQUEST_TIMEOUT,
            "request cancelled",
        )),
        Err(e) => {
            warn!(error = %e, "no provider could serve the request");
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
    }
}

/// Circuit status of every registered model
pub async fn model_health(State(state): State<AppState>) -> Json<Vec<ModelHealth>> {
    Json(state.router.model_health())
}
