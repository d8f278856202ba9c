//! Error types for the REST API server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::daily_series::SeriesProviderError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Invalid or missing parameter in request
    InvalidParameter(String),
    /// Request exceeds a server-side limit
    LimitExceeded(String),
    /// No series source could produce data
    SeriesUnavailable(String),
    /// Internal server error
    InternalError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ApiError::LimitExceeded(msg) => write!(f, "Limit exceeded: {}", msg),
            ApiError::SeriesUnavailable(msg) => write!(f, "Series unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::InvalidParameter(msg) => {
                (StatusCode::BAD_REQUEST, "InvalidParameter", msg.clone())
            }
            ApiError::LimitExceeded(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "LimitExceeded", msg.clone())
            }
            ApiError::SeriesUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, "SeriesUnavailable", msg.clone())
            }
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                msg.clone(),
            ),
        };

        let body = Json(json!({
            "error": error_type,
            "message": message,
        }));

        (status, body).into_response()
    }
}

// Conversions from other error types

impl From<SeriesProviderError> for ApiError {
    fn from(err: SeriesProviderError) -> Self {
        match err {
            SeriesProviderError::InvalidDateRange => ApiError::InvalidParameter(err.to_string()),
            _ => ApiError::SeriesUnavailable(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalError(format!("Worker task failed: {}", err))
    }
}
