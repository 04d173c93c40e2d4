//! Core functionality for the gateway
//!
//! - `types` - Requests, responses, context and capabilities
//! - `traits` - The provider interface and its error mapping seams
//! - `providers` - OpenAI and Anthropic implementations
//! - `streaming` - Stream sink and SSE forwarding
//! - `router` - The manager: retry, fallback, bookkeeping
//! - `health` - Provider health registry and background prober
//! - `cost` - Pricing table and usage tracker

pub mod cost;
pub mod health;
pub mod providers;
pub mod router;
pub mod streaming;
pub mod traits;
pub mod types;
