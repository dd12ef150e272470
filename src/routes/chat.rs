//! Relay endpoint
//!
//! Accepts the generic `{messages, options}` payload, normalizes and
//! validates it, short-circuits the liveness probe, and otherwise forwards
//! one completion call upstream, reshaping the reply into the generic
//! success shape.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    chat::{normalize, CompletionParams, ProxyRequest, ProxyResponse, PONG},
    error::{AppError, AppResult},
    AppState,
};

/// Handle a relay request
///
/// Stateless: every invocation parses, validates, translates, calls upstream
/// at most once, and returns. Nothing is retained between calls.
pub async fn relay_chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<ProxyResponse>> {
    let request_id = Uuid::new_v4();

    let request: ProxyRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Rejected malformed relay payload");
        AppError::BadRequest(format!("Invalid request body: {}", e))
    })?;

    let received = request.messages.len();
    let messages = normalize::filter_messages(&request.messages);
    let messages = normalize::apply_variant(messages, state.config.variant);
    normalize::validate_conversation(&messages)?;

    if normalize::is_liveness_probe(&messages) {
        info!(request_id = %request_id, "Answering liveness probe");
        return Ok(Json(ProxyResponse::assistant(PONG)));
    }

    info!(
        request_id = %request_id,
        received = received,
        forwarded = messages.len(),
        backend = state.backend.name(),
        "Relaying chat completion"
    );

    let params = CompletionParams::new(messages, &request.options);
    let reply = state.backend.complete(&params).await?;

    info!(
        request_id = %request_id,
        reply_len = reply.len(),
        "Relay completed"
    );

    Ok(Json(ProxyResponse::assistant(reply)))
}
