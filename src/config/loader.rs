//! Configuration loading from the environment
//!
//! Every setting has a default; a provider is configured only when its API key variable is set.
//! Provider timeouts fall back to `AI_DEFAULT_TIMEOUT_SECS`.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use super::models::*;
use super::validation::Validate;
use crate::utils::error::{GatewayError, Result};

impl GatewayConfig {
    /// Load configuration from environment variables, after loading `.env` if there is one
    ///
    /// Variables already present in the process environment win over `.env` entries.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit env file layered under the process environment
    ///
    /// The process environment is not modified.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            GatewayError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut file = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                GatewayError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            file.insert(key, value);
        }

        Self::from_lookup(|key| env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Load configuration through `lookup`; unset keys keep their defaults
    ///
    /// The result is validated before it is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        // Manager configuration
        let manager = &mut config.manager;
        if let Some(provider) = get("AI_DEFAULT_PROVIDER") {
            manager.default_provider = provider.to_lowercase();
        }
        if let Some(value) = get("AI_ENABLE_FALLBACK") {
            manager.enable_fallback = parse_bool("AI_ENABLE_FALLBACK", &value)?;
        }
        if let Some(value) = get("AI_MAX_RETRIES") {
            manager.max_retries = parse("AI_MAX_RETRIES", &value)?;
        }
        if let Some(value) = get("AI_RETRY_BACKOFF_MS") {
            manager.retry_backoff = Duration::from_millis(parse("AI_RETRY_BACKOFF_MS", &value)?);
        }
        if let Some(value) = get("AI_RETRY_BACKOFF_MULTIPLIER") {
            manager.retry_backoff_multiplier = parse("AI_RETRY_BACKOFF_MULTIPLIER", &value)?;
        }
        if let Some(value) = get("AI_DEFAULT_TIMEOUT_SECS") {
            manager.default_timeout = secs("AI_DEFAULT_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("AI_ENABLE_COST_TRACKING") {
            manager.enable_cost_tracking = parse_bool("AI_ENABLE_COST_TRACKING", &value)?;
        }
        if let Some(value) = get("AI_ENABLE_HEALTH_CHECKS") {
            manager.enable_health_checks = parse_bool("AI_ENABLE_HEALTH_CHECKS", &value)?;
        }
        if let Some(value) = get("AI_HEALTH_CHECK_INTERVAL_SECS") {
            manager.health_check_interval = secs("AI_HEALTH_CHECK_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = get("AI_HEALTH_CHECK_TIMEOUT_SECS") {
            manager.health_check_timeout = secs("AI_HEALTH_CHECK_TIMEOUT_SECS", &value)?;
        }
        let default_timeout_secs = manager.default_timeout.as_secs();

        // OpenAI
        if let Some(api_key) = get("OPENAI_API_KEY") {
            let mut openai = OpenAIConfig::new(api_key);
            if let Some(base_url) = get("OPENAI_BASE_URL") {
                openai.base_url = base_url;
            }
            if let Some(model) = get("OPENAI_MODEL") {
                openai.model = model;
            }
            openai.organization = get("OPENAI_ORGANIZATION");
            openai.timeout_secs = match get("OPENAI_TIMEOUT_SECS") {
                Some(value) => parse("OPENAI_TIMEOUT_SECS", &value)?,
                None => default_timeout_secs,
            };
            config.openai = Some(openai);
        }

        // Anthropic
        if let Some(api_key) = get("ANTHROPIC_API_KEY") {
            let mut anthropic = AnthropicConfig::new(api_key);
            if let Some(base_url) = get("ANTHROPIC_BASE_URL") {
                anthropic.base_url = base_url;
            }
            if let Some(model) = get("ANTHROPIC_MODEL") {
                anthropic.model = model;
            }
            if let Some(version) = get("ANTHROPIC_API_VERSION") {
                anthropic.api_version = version;
            }
            anthropic.timeout_secs = match get("ANTHROPIC_TIMEOUT_SECS") {
                Some(value) => parse("ANTHROPIC_TIMEOUT_SECS", &value)?,
                None => default_timeout_secs,
            };
            config.anthropic = Some(anthropic);
        }

        // Logging
        if let Some(level) = get("GATEWAY_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = get("GATEWAY_LOG_FORMAT") {
            config.logging.format = format
                .parse::<LogFormat>()
                .map_err(|e| GatewayError::Config(format!("Invalid GATEWAY_LOG_FORMAT: {}", e)))?;
        }

        config.validate().map_err(GatewayError::Config)?;
        debug!(
            providers = ?config.configured_providers(),
            default_provider = %config.manager.default_provider,
            "Configuration loaded from environment"
        );
        Ok(config)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid {}: {}", key, e)))
}

fn secs(key: &str, value: &str) -> Result<Duration> {
    parse::<u64>(key, value).map(Duration::from_secs)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(GatewayError::Config(format!(
            "Invalid {}: expected a boolean, got '{}'",
            key, other
        ))),
    }
}
