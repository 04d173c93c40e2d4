//! Request routing across providers
//!
//! - `config` - Manager configuration and its validation
//! - `execution` - Bounded retry with exponential backoff
//! - `manager` - The [`Manager`]: try-order, fallback, health and cost bookkeeping

pub mod config;
pub mod execution;
pub mod manager;

#[cfg(test)]
mod tests;

pub use config::ManagerConfig;
pub use execution::{MAX_BACKOFF, RetryOutcome, RetryPolicy};
pub use manager::Manager;
