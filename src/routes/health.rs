//! Health check endpoint
//!
//! Reports process liveness, uptime, and whether the upstream provider key
//! is configured. The relay itself holds no dependencies worth probing; the
//! in-band ping/pong probe on the chat endpoint covers end-to-end liveness.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub upstream_configured: bool,
}

/// Health check endpoint
///
/// Returns 200 with `degraded` status when the upstream API key is missing,
/// since relay requests would fail with a configuration error.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let upstream_configured = state.config.anthropic_api_key.is_some();

    let status = if upstream_configured {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        upstream_configured,
    };

    (StatusCode::OK, Json(response))
}
