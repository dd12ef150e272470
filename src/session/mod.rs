//! Client-side conversation session
//!
//! `ChatClient` issues requests against the relay endpoint; `ChatSession`
//! owns the per-conversation state the UI layer consults: conversation
//! history, remaining quota, the single-outstanding-request guard, and the
//! online flag fed by the liveness probe. Sessions are independent objects
//! with no shared state between them.

use tracing::{debug, warn};

use crate::{
    chat::{
        ChatMessage, GenerationOptions, IncomingMessage, ProxyRequest, ProxyResponse, PING, PONG,
    },
    error::{AppError, AppResult},
};

/// Apology turn appended to the conversation when a send fails
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again.";

/// Default number of messages a fresh session may send
const DEFAULT_QUOTA: u32 = 20;

/// HTTP client for the relay endpoint
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    /// Create a new chat client against the given relay endpoint URL
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Send one relay request and return the assistant text
    pub async fn send(&self, request: &ProxyRequest) -> AppResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::UpstreamTransport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamTransport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<crate::error::ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("Relay returned status {}", status));
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ProxyResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::UpstreamFormat(format!("Invalid JSON from relay: {}", e))
        })?;
        parsed
            .first_content()
            .map(String::from)
            .ok_or_else(|| AppError::UpstreamFormat("Relay response had no choices".to_string()))
    }

    /// Probe relay liveness with the ping request
    ///
    /// Returns true only when the reply content is exactly "pong"; any
    /// failure (transport, status, shape, wrong content) reads as offline.
    pub async fn probe(&self) -> bool {
        let request = ProxyRequest {
            messages: vec![IncomingMessage::from(&ChatMessage::user(PING))],
            options: GenerationOptions::default(),
        };
        match self.send(&request).await {
            Ok(reply) => reply == PONG,
            Err(e) => {
                debug!(error = %e, "Liveness probe failed");
                false
            }
        }
    }
}

/// Reason a send was refused without touching the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A previous send is still outstanding
    InFlight,
    /// The quota counter reached zero
    QuotaExhausted,
    /// The last liveness probe marked the relay offline
    Offline,
}

/// Outcome of a send attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The assistant replied; history extended, quota decremented
    Sent { reply: String },
    /// The request failed; apology appended, quota untouched
    Failed { error: String },
    /// The send was refused before anything happened
    Skipped(SkipReason),
}

/// Per-conversation session state
pub struct ChatSession {
    history: Vec<ChatMessage>,
    quota: u32,
    in_flight: bool,
    online: bool,
    options: GenerationOptions,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA)
    }
}

impl ChatSession {
    /// Create a session with the given message quota
    ///
    /// Sessions start online; the flag only changes when a liveness probe
    /// observes otherwise.
    pub fn new(quota: u32) -> Self {
        Self {
            history: Vec::new(),
            quota,
            in_flight: false,
            online: true,
            options: GenerationOptions::default(),
        }
    }

    /// Conversation history in order
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Remaining message quota
    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Whether the relay was online at the last probe
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Compose the relay request for the current history
    pub fn compose_request(&self) -> ProxyRequest {
        ProxyRequest {
            messages: self.history.iter().map(IncomingMessage::from).collect(),
            options: self.options.clone(),
        }
    }

    /// Send a user message through the relay
    ///
    /// Refused without side effects while a send is outstanding, when the
    /// quota is exhausted, or when the relay is marked offline. On success
    /// the assistant turn is appended and the quota decremented; on failure
    /// a fixed apology turn is appended and the quota left untouched.
    pub async fn send(&mut self, client: &ChatClient, text: impl Into<String>) -> SendOutcome {
        if self.in_flight {
            return SendOutcome::Skipped(SkipReason::InFlight);
        }
        if self.quota == 0 {
            return SendOutcome::Skipped(SkipReason::QuotaExhausted);
        }
        if !self.online {
            return SendOutcome::Skipped(SkipReason::Offline);
        }

        self.in_flight = true;
        self.history.push(ChatMessage::user(text));
        let request = self.compose_request();

        let result = client.send(&request).await;
        self.in_flight = false;

        match result {
            Ok(reply) => {
                self.history.push(ChatMessage::assistant(reply.clone()));
                self.quota -= 1;
                SendOutcome::Sent { reply }
            }
            Err(e) => {
                warn!(error = %e, "Send failed, appending apology turn");
                self.history.push(ChatMessage::assistant(APOLOGY));
                SendOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Refresh the online flag from a liveness probe
    ///
    /// Has no effect on conversation state.
    pub async fn refresh_liveness(&mut self, client: &ChatClient) {
        self.online = client.probe().await;
    }

    /// Force the in-flight guard for concurrency tests
    #[cfg(any(test, feature = "test-utils"))]
    pub fn mark_in_flight(&mut self) {
        self.in_flight = true;
    }

    /// Force the online flag for offline-path tests
    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}
