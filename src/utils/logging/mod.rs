//! Logging utilities
//!
//! Installs the process-wide `tracing` subscriber.

pub mod logging;

pub use logging::{LogFormat, LoggingConfig, init_logging};
