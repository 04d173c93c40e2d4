//! Core traits module

pub mod config;
pub mod error_mapper;
pub mod provider;

pub use config::ProviderConfig;
pub use error_mapper::{ErrorMapper, parse_retry_after};
pub use provider::Provider;
