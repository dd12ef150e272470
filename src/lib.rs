//! Courier - Minimal chat relay proxy
//!
//! This library provides the core functionality for the Courier relay
//! server. It normalizes generic chat payloads from a browser client,
//! forwards them to the Anthropic Messages API, and reshapes the reply into
//! the generic response shape the client expects. A client-side session
//! handler for consuming the relay lives in the `session` module.

pub mod chat;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod upstream;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::chat::{ProxyRequest, ProxyResponse};
pub use crate::config::{Config, RelayVariant};
pub use crate::error::{AppError, AppResult};
pub use crate::session::{ChatClient, ChatSession};
pub use crate::upstream::{AnthropicClient, ChatBackend};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    /// Upstream backend the relay forwards completions to
    pub backend: Arc<dyn ChatBackend>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // HTTP client with connection pooling, shared with the backend
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(std::time::Duration::from_secs(300))
            .build()?;

        let backend: Arc<dyn ChatBackend> =
            Arc::new(AnthropicClient::new(http_client.clone(), &config));

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            backend,
        })
    }

    /// Create application state with an injected backend for testing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(config: Config, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            start_time: Instant::now(),
            backend,
        }
    }
}
