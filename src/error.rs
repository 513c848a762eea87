//! Application error types and their HTTP mappings

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::models::ErrorResponse;

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// The inbound request is malformed or missing required data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested model has no configured backend webhook
    #[error("Invalid model name: {0}")]
    ModelNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The backend answered with a failure status or an unusable body
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend item stream could not be decoded
    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Transport-level failure talking to the backend
    #[error("Backend request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to.
    ///
    /// Unknown models are a client error on this API (the observed contract
    /// answers 400, not 404). Backend trouble surfaces as 502, except
    /// timeouts which are 504.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::ModelNotFound(_) => StatusCode::BAD_REQUEST,
            AppError::Backend(_) | AppError::Decode(_) => StatusCode::BAD_GATEWAY,
            AppError::HttpClient(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(
            AppError::InvalidRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ModelNotFound("gpt-x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn backend_errors_map_to_502() {
        assert_eq!(
            AppError::Backend("boom".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            AppError::Decode(decode).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
