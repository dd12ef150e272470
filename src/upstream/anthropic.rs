//! Anthropic Messages API client
//!
//! Builds the provider payload from normalized completion parameters, makes
//! a single non-streaming call, and extracts the assistant text. The raw
//! response body is read as text before JSON parsing so that parse failures
//! are reported distinctly from HTTP-level failures.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::{
    chat::{ChatMessage, CompletionParams},
    config::Config,
    error::{AppError, AppResult},
    upstream::ChatBackend,
};

/// Maximum raw-body excerpt length used in error messages
const ERROR_EXCERPT_LEN: usize = 200;

/// Request body for the Anthropic Messages API
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

/// Success body from the Anthropic Messages API (fields we consume)
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Error body from the Anthropic Messages API
#[derive(Debug, Deserialize)]
struct MessagesErrorBody {
    error: MessagesErrorDetail,
}

#[derive(Debug, Deserialize)]
struct MessagesErrorDetail {
    message: String,
}

/// Anthropic Messages API client
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    version: String,
    model: String,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.anthropic_api_url.clone(),
            api_key: config.anthropic_api_key.clone(),
            version: config.anthropic_version.clone(),
            model: config.model.clone(),
        }
    }
}

/// Truncate a raw body for inclusion in an error message
fn excerpt(body: &str) -> String {
    let mut end = body.len().min(ERROR_EXCERPT_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

#[async_trait]
impl ChatBackend for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    #[instrument(skip(self, params), fields(messages = params.messages.len()))]
    async fn complete(&self, params: &CompletionParams) -> AppResult<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::Config("ANTHROPIC_API_KEY is not configured".to_string())
        })?;

        let url = format!("{}/v1/messages", self.base_url);
        let payload = MessagesRequest {
            model: &self.model,
            max_tokens: params.max_tokens,
            messages: &params.messages,
            temperature: params.temperature,
            system: params.system.as_deref(),
        };

        debug!(
            url = %url,
            model = %self.model,
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            "Forwarding completion to Anthropic"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.version)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to reach Anthropic");
                AppError::UpstreamTransport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamTransport(e.to_string()))?;

        debug!(status = %status, body_len = body.len(), "Anthropic response received");

        if !status.is_success() {
            let message = match serde_json::from_str::<MessagesErrorBody>(&body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => excerpt(&body),
            };
            error!(status = %status, message = %message, "Anthropic request failed");
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse Anthropic success body");
            AppError::UpstreamFormat(format!("Invalid JSON from upstream: {}", e))
        })?;

        let first = parsed.content.first().ok_or_else(|| {
            AppError::UpstreamFormat("Upstream response contained no content blocks".to_string())
        })?;
        let text = first.text.as_deref().ok_or_else(|| {
            AppError::UpstreamFormat(
                "First upstream content block has no text field".to_string(),
            )
        })?;

        Ok(text.trim().to_string())
    }
}
