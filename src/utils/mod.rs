//! Utility modules for the gateway
//!
//! - **duration**: `Duration` serde codecs
//! - **error**: Crate-level error type
//! - **logging**: `tracing` subscriber setup

pub mod duration;
pub mod error;
pub mod logging;

pub use error::{GatewayError, Result};
pub use logging::{LogFormat, LoggingConfig, init_logging};
