use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    error::Result,
    providers::{build_provider_stack, ProviderAdapter, ProviderStack},
    router::ModelRouter,
};

pub mod routes;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<dyn ProviderAdapter>,
    pub router: Arc<ModelRouter>,
}

impl From<ProviderStack> for AppState {
    fn from(stack: ProviderStack) -> Self {
        Self {
            chain: stack.chain,
            router: stack.router,
        }
    }
}

/// HTTP routes, without binding a socket.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/v1/generate", post(routes::generate))
        .route("/v1/models/health", get(routes::model_health))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub struct RelayServer {
    config: Config,
}

impl RelayServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn start(&self) -> Result<()> {
        let state = AppState::from(build_provider_stack(&self.config));
        let app = app(state);

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr).await?;

        info!("Relay server starting on http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "relay",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
