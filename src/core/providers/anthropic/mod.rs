//! Anthropic Provider
//!
//! Messages API integration. System messages are lifted into the top-level `system` field and
//! `max_tokens` is always sent, since the API requires it.

pub mod client;
pub mod config;
pub mod error;
pub mod streaming;
pub mod transformer;

pub use client::AnthropicProvider;
pub use config::AnthropicConfig;
pub use error::AnthropicErrorMapper;
pub use streaming::AnthropicStreamTransformer;
