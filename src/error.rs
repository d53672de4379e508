use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP server error: {0}")]
    Http(#[from] axum::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("No enabled provider could serve the request: {0}")]
    ProviderUnavailable(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid model registry: {0}")]
    InvalidModel(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Failure of a single backend call. Never escapes the fallback loop.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend call timed out after {0}ms")]
    Timeout(u64),

    #[error("backend call cancelled by caller")]
    Cancelled,

    #[error("backend response carried no generated content")]
    EmptyContent,
}

impl BackendError {
    /// Whether the failure should count against the model's circuit.
    pub fn is_backend_fault(&self) -> bool {
        !matches!(self, BackendError::Cancelled)
    }
}
