//! OpenAI Provider
//!
//! Chat Completions integration: bearer auth, optional organization header, SSE streaming that
//! ends with `[DONE]`, and vision through `image_url` content parts.

pub mod client;
pub mod config;
pub mod error;
pub mod streaming;
pub mod transformer;

pub use client::OpenAIProvider;
pub use config::OpenAIConfig;
pub use error::OpenAIErrorMapper;
pub use streaming::OpenAIStreamTransformer;
