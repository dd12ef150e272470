//! Generic chat payload handling
//!
//! The wire types exchanged with the browser client and the normalization
//! pipeline that turns a loose client payload into upstream call parameters.

pub mod normalize;
pub mod types;

pub use normalize::{CompletionParams, PING, PONG};
pub use types::{ChatMessage, GenerationOptions, IncomingMessage, ProxyRequest, ProxyResponse, Role};
