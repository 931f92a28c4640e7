use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Use anyhow::Result for internal error handling
// Use thiserror for well-typed errors that need to be handled specifically

/// Application-specific errors that need special handling
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unknown model: {0}")]
    ModelNotFound(String),

    #[error("Model {0} does not support image input")]
    VisionNotSupported(String),

    /// The user has not stored an API key for the provider a task resolved to.
    #[error("No API key configured for {0}")]
    MissingUserApiKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-success status from a provider API, message taken from the
    /// provider's error envelope when one is present.
    #[error("Provider error: {message}")]
    Provider { status: u16, message: String },

    /// The provider answered 200 but carried no usable content.
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("No structured data found in model response")]
    NoStructuredData,

    #[error("Malformed structured data in model response: {0}")]
    MalformedStructuredData(String),

    #[error("{0} returned no image")]
    NoImageProduced(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn model_not_found(id: impl Into<String>) -> Self {
        Self::ModelNotFound(id.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn provider_error(status: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ModelNotFound(_) => StatusCode::BAD_REQUEST,
            AppError::VisionNotSupported(_) => StatusCode::BAD_REQUEST,
            AppError::MissingUserApiKey(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::EmptyResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NoStructuredData => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MalformedStructuredData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NoImageProduced(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        // Boundary contract: error bodies are a single user-facing string.
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convert from anyhow::Error to AppError for error context
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Log the full error chain for debugging
        tracing::error!("Application error: {:?}", err);
        AppError::Internal(err.to_string())
    }
}

/// Helper type for results that use anyhow for error handling
pub type AppResult<T> = Result<T, AppError>;

/// Helper type for results that use anyhow for internal operations
pub type AnyhowResult<T> = anyhow::Result<T>;
