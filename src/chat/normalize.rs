//! Request normalization for the relay endpoint
//!
//! Filters the loose client payload into well-formed messages, validates the
//! conversation shape, detects the liveness probe, and maps client-facing
//! generation options onto upstream parameter values.

use crate::{
    chat::types::{ChatMessage, GenerationOptions, IncomingMessage, Role},
    config::RelayVariant,
    error::{AppError, AppResult},
};

/// Liveness probe request content
pub const PING: &str = "ping";
/// Canned liveness probe reply
pub const PONG: &str = "pong";

/// Hard ceiling on upstream max_tokens
const MAX_OUTPUT_TOKENS: i64 = 4096;
/// Default max_tokens when the client did not ask for a length
const DEFAULT_OUTPUT_TOKENS: i64 = 1024;
/// Default temperature when creativity is absent
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Filter the raw client messages into well-formed chat messages
///
/// Entries missing role or content are dropped. Any role other than
/// `assistant` is coerced to `user`. Content is trimmed, and entries whose
/// trimmed content is empty are dropped.
pub fn filter_messages(raw: &[IncomingMessage]) -> Vec<ChatMessage> {
    raw.iter()
        .filter_map(|message| {
            let role = message.role.as_deref()?;
            let content = message.content.as_deref()?.trim();
            if content.is_empty() {
                return None;
            }
            let role = if role == "assistant" {
                Role::Assistant
            } else {
                Role::User
            };
            Some(ChatMessage {
                role,
                content: content.to_string(),
            })
        })
        .collect()
}

/// Apply the configured relay variant to the filtered conversation
///
/// The single-turn variant forwards only the final message, discarding any
/// earlier history the client sent.
pub fn apply_variant(mut messages: Vec<ChatMessage>, variant: RelayVariant) -> Vec<ChatMessage> {
    match variant {
        RelayVariant::MultiTurn => messages,
        RelayVariant::SingleTurn => match messages.pop() {
            Some(last) => vec![last],
            None => Vec::new(),
        },
    }
}

/// Validate the filtered conversation before contacting upstream
///
/// The filtered sequence must be non-empty and start with a user message.
pub fn validate_conversation(messages: &[ChatMessage]) -> AppResult<()> {
    let first = messages.first().ok_or_else(|| {
        AppError::BadRequest("No valid messages in request".to_string())
    })?;
    if first.role != Role::User {
        return Err(AppError::BadRequest(
            "Conversation must start with a user message".to_string(),
        ));
    }
    Ok(())
}

/// Detect the liveness probe: a sole user message whose content is "ping"
pub fn is_liveness_probe(messages: &[ChatMessage]) -> bool {
    match messages {
        [only] => only.role == Role::User && only.content == PING,
        _ => false,
    }
}

/// Clamp the requested output length into [1, 4096], defaulting to 1024
pub fn clamp_max_tokens(requested: Option<i64>) -> u32 {
    requested
        .unwrap_or(DEFAULT_OUTPUT_TOKENS)
        .clamp(1, MAX_OUTPUT_TOKENS) as u32
}

/// Map creativity in [0, 100] to a temperature in [0, 1]
///
/// Out-of-range values clamp to the nearest bound; absence maps to 0.7.
pub fn temperature_from_creativity(creativity: Option<f64>) -> f64 {
    match creativity {
        Some(value) => (value / 100.0).clamp(0.0, 1.0),
        None => DEFAULT_TEMPERATURE,
    }
}

/// Parameters for one upstream completion call
///
/// The output of the translation step: filtered messages plus fully
/// defaulted and clamped generation parameters. The upstream client adds the
/// model and credentials from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system: Option<String>,
}

impl CompletionParams {
    /// Translate a validated conversation and client options
    pub fn new(messages: Vec<ChatMessage>, options: &GenerationOptions) -> Self {
        Self {
            messages,
            max_tokens: clamp_max_tokens(options.max_output_length),
            temperature: temperature_from_creativity(options.creativity),
            system: options.system_prompt.clone(),
        }
    }
}
