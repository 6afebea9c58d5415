use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use menufeed::{FetchError, NormalizeError, PipelineError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Fetch failed: {0}")]
    Fetch(FetchError),

    #[error("Normalization failed: {0}")]
    Normalize(NormalizeError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Fetch(_) | ServerError::Normalize(_) => StatusCode::BAD_GATEWAY,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Fetch(_) => "FETCH_FAILED",
            ServerError::Normalize(_) => "NORMALIZE_FAILED",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = %error_code, error = %message, "request_failed");
        } else {
            tracing::debug!(code = %error_code, "request_rejected");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: error_code,
                message,
            },
        });

        (status, body).into_response()
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Fetch(err) => ServerError::Fetch(err),
            PipelineError::Normalize(err) => ServerError::Normalize(err),
        }
    }
}

impl From<FetchError> for ServerError {
    fn from(err: FetchError) -> Self {
        ServerError::Fetch(err)
    }
}
