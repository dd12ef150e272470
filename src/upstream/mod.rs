//! Upstream provider abstraction
//!
//! Defines the trait interface for the LLM backend the relay forwards to,
//! so handlers and tests can swap implementations.

pub mod anthropic;

use async_trait::async_trait;

use crate::{chat::CompletionParams, error::AppResult};

pub use anthropic::AnthropicClient;

/// Trait defining the interface for chat backends
///
/// Implementations handle one non-streaming completion call against a
/// specific provider and return the extracted assistant text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Perform one completion call and return the trimmed assistant text
    async fn complete(&self, params: &CompletionParams) -> AppResult<String>;
}
