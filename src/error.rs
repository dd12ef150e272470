//! Error types for Courier
//!
//! This module defines custom error types used throughout the application.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    #[error("Upstream returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Unexpected upstream response: {0}")]
    UpstreamFormat(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
///
/// The flat `{error, details?}` shape the relay returns for every failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Guidance for common upstream status codes
///
/// The status code is carried structurally through the error path, so the
/// branch is on the number itself rather than substring matching on the
/// provider's message text.
fn upstream_status_guidance(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Upstream rejected the API key. Check ANTHROPIC_API_KEY."),
        429 => Some("Upstream rate limit hit. Retry after a short wait."),
        400 => Some("Upstream rejected the request as malformed."),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
                Some(msg.clone()),
            ),
            AppError::UpstreamTransport(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to reach upstream provider".to_string(),
                Some(msg.clone()),
            ),
            AppError::UpstreamStatus { status, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                message.clone(),
                upstream_status_guidance(*status).map(String::from),
            ),
            AppError::UpstreamFormat(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected response from upstream provider".to_string(),
                Some(msg.clone()),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            ),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
