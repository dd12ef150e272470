//! Configuration management for Courier
//!
//! Configuration is loaded from environment variables.

use anyhow::{bail, Context, Result};
use std::env;

/// Relay behavior variant
///
/// `MultiTurn` forwards the full filtered conversation history upstream.
/// `SingleTurn` keeps only the final message, acting as a simplified
/// single-message forwarder. The variant also widens the CORS surface
/// (GET and Authorization are allowed in single-turn mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayVariant {
    MultiTurn,
    SingleTurn,
}

impl RelayVariant {
    /// Parse a variant from its configuration value
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "multi_turn" => Ok(RelayVariant::MultiTurn),
            "single_turn" => Ok(RelayVariant::SingleTurn),
            other => bail!("Invalid COURIER_VARIANT: {}", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Anthropic API base URL
    pub anthropic_api_url: String,
    /// Anthropic API key. Absence is surfaced as a configuration error at
    /// request time, not at startup.
    pub anthropic_api_key: Option<String>,
    /// Value for the `anthropic-version` header
    pub anthropic_version: String,

    /// Model identifier sent upstream
    pub model: String,

    /// Relay behavior variant
    pub variant: RelayVariant,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("COURIER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("COURIER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid COURIER_PORT")?,

            anthropic_api_url: env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),
            anthropic_version: env::var("ANTHROPIC_VERSION")
                .unwrap_or_else(|_| "2023-06-01".to_string()),

            model: env::var("COURIER_MODEL")
                .unwrap_or_else(|_| "claude-3-5-haiku-20241022".to_string()),

            variant: match env::var("COURIER_VARIANT") {
                Ok(value) => RelayVariant::parse(&value)?,
                Err(_) => RelayVariant::MultiTurn,
            },
        })
    }
}
