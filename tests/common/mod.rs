//! Common test utilities for llm-gateway
//!
//! - Mock upstream servers and wire payloads (`providers`)
//! - Custom assertions (`assertions`)
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::providers::{MockOpenAI, openai_chat_body};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let upstream = MockOpenAI::start().await;
//!     upstream.respond_with(200, openai_chat_body("Hi", 10, 2)).await;
//!     let provider = upstream.provider();
//!     // ...
//! }
//! ```

pub mod providers;

use llm_gateway::ManagerConfig;
use std::time::Duration;

/// Skip test if API key is not available
#[macro_export]
macro_rules! skip_without_api_key {
    ($provider:expr) => {
        let key_var = match $provider {
            "openai" => "OPENAI_API_KEY",
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => {
                panic!("Unknown provider: {}", $provider);
            }
        };
        if std::env::var(key_var).is_err() {
            eprintln!("Skipping test: {} not set for {} provider", key_var, $provider);
            return;
        }
    };
}

/// Manager configuration with short backoff and no background prober
pub fn fast_manager_config() -> ManagerConfig {
    ManagerConfig::default()
        .with_max_retries(2)
        .with_retry_backoff(Duration::from_millis(10), 2.0)
        .with_health_checks(false)
}
