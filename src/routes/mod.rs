//! HTTP routes for Courier
//!
//! This module defines all HTTP endpoints exposed by the relay.

pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::RelayVariant, AppState};

/// Create the main application router
///
/// The chat route accepts POST only; axum answers other methods with 405 and
/// the CORS layer handles OPTIONS pre-flight. The single-turn variant widens
/// the advertised CORS surface with GET and Authorization.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = match state.config.variant {
        RelayVariant::MultiTurn => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
        RelayVariant::SingleTurn => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    };

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/chat", post(chat::relay_chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
