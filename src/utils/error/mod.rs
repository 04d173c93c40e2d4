//! Error handling for the gateway
//!
//! Provider failures are described by
//! [`ProviderError`](crate::core::providers::unified_provider::ProviderError); this module holds
//! the crate-level error used for configuration and startup.

pub mod error;

pub use error::{GatewayError, Result};
