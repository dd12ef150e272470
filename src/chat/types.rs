//! Wire types for the relay endpoint
//!
//! Defines the generic chat payload exchanged between the browser client and
//! the proxy, plus the success response shape returned to the client.

use serde::{Deserialize, Serialize};

/// Role of a message participant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message from the human
    User,
    /// Assistant message from the AI
    Assistant,
}

/// A normalized chat message with role and non-empty content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A message as received from the client, before filtering
///
/// Both fields are optional on the wire; entries missing either are dropped
/// during normalization rather than rejecting the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<&ChatMessage> for IncomingMessage {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self {
            role: Some(role.to_string()),
            content: Some(message.content.clone()),
        }
    }
}

/// Generation options supplied by the client
///
/// All fields are optional; defaults and clamping are applied server-side
/// during translation to the upstream payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Requested output length cap, clamped into [1, 4096]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_length: Option<i64>,
    /// Creativity in [0, 100], mapped linearly to temperature in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creativity: Option<f64>,
    /// Optional system prompt, forwarded only when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// The generic payload the client POSTs to the relay
///
/// Both fields are required at the JSON level; a body missing either fails
/// validation before any upstream call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub messages: Vec<IncomingMessage>,
    pub options: GenerationOptions,
}

/// A single choice in the success response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    pub message: ChatMessage,
}

/// Success response returned to the client
///
/// Always carries exactly one choice holding the assistant reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyResponse {
    pub choices: Vec<Choice>,
}

impl ProxyResponse {
    /// Wrap an assistant reply in the success shape
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChatMessage::assistant(content),
            }],
        }
    }

    /// The assistant text of the first choice, if present
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}
