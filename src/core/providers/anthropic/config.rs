//! Anthropic Provider Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::traits::ProviderConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// The Messages API requires `max_tokens`; used when a request sets none
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_key: String,
    /// API host, without the `/v1` segment
    pub base_url: String,
    pub model: String,
    /// Sent as `anthropic-version`
    pub api_version: String,
    pub default_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }
}

impl ProviderConfig for AnthropicConfig {
    fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("Anthropic API key is required".to_string());
        }
        crate::config::validation::validate_base_url("Anthropic", &self.base_url)?;
        if self.model.trim().is_empty() {
            return Err("Anthropic default model must not be empty".to_string());
        }
        if self.api_version.trim().is_empty() {
            return Err("Anthropic API version must not be empty".to_string());
        }
        if self.default_max_tokens == 0 {
            return Err("Anthropic default max_tokens must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Anthropic timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn api_base(&self) -> &str {
        &self.base_url
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
