//! Configuration management for the gateway
//!
//! Configuration is read from the environment (optionally seeded from a `.env` file) and
//! validated before any provider is built.

pub mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;
