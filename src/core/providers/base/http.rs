//! Shared HTTP client construction

use std::time::Duration;

use reqwest::Client;

use crate::core::providers::unified_provider::ProviderError;

/// Connection pool settings applied to every provider client
pub struct PoolConfig;

impl PoolConfig {
    pub const POOL_SIZE: usize = 32;
    pub const KEEPALIVE_SECS: u64 = 90;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Build the pooled client a provider uses for all of its calls
pub fn build_http_client(provider: &str, timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(PoolConfig::CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(PoolConfig::KEEPALIVE_SECS))
        .pool_max_idle_per_host(PoolConfig::POOL_SIZE)
        .user_agent(concat!("llm-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            ProviderError::configuration(provider, format!("Failed to create HTTP client: {}", e))
        })
}

/// Join a base URL and an endpoint path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
