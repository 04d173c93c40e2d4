//! Manager configuration
//!
//! Static settings read once at construction: retry policy, fallback, cost tracking and the
//! background health prober.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::execution::RetryPolicy;
use crate::config::Validate;

/// Upper bound on `max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Manager configuration
///
/// ## Defaults
///
/// - `default_provider`: "openai"
/// - `enable_fallback`: true
/// - `max_retries`: 3
/// - `retry_backoff`: 1s
/// - `retry_backoff_multiplier`: 2.0
/// - `default_timeout`: 60s
/// - `enable_cost_tracking`: true
/// - `enable_health_checks`: true
/// - `health_check_interval`: 30s
/// - `health_check_timeout`: 10s
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Provider tried first on every call
    pub default_provider: String,

    /// Try the other providers when the default fails
    pub enable_fallback: bool,

    /// Retries per provider after the first attempt (0-10)
    pub max_retries: u32,

    /// Sleep before the first retry
    #[serde(with = "crate::utils::duration::millis")]
    pub retry_backoff: Duration,

    /// Factor applied to the backoff after every attempt (>= 1.0)
    pub retry_backoff_multiplier: f64,

    /// Default upstream request timeout
    #[serde(with = "crate::utils::duration::millis")]
    pub default_timeout: Duration,

    pub enable_cost_tracking: bool,

    /// Run the background prober
    pub enable_health_checks: bool,

    #[serde(with = "crate::utils::duration::millis")]
    pub health_check_interval: Duration,

    /// Bound on each individual probe
    #[serde(with = "crate::utils::duration::millis")]
    pub health_check_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            enable_fallback: true,
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
            retry_backoff_multiplier: 2.0,
            default_timeout: Duration::from_secs(60),
            enable_cost_tracking: true,
            enable_health_checks: true,
            health_check_interval: Duration::from_secs(30),
            health_check_timeout: Duration::from_secs(10),
        }
    }
}

impl ManagerConfig {
    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.enable_fallback = enabled;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration, multiplier: f64) -> Self {
        self.retry_backoff = backoff;
        self.retry_backoff_multiplier = multiplier;
        self
    }

    pub fn with_health_checks(mut self, enabled: bool) -> Self {
        self.enable_health_checks = enabled;
        self
    }

    pub fn with_cost_tracking(mut self, enabled: bool) -> Self {
        self.enable_cost_tracking = enabled;
        self
    }

    /// Retry policy applied to each provider
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.retry_backoff,
            self.retry_backoff_multiplier,
        )
    }
}

impl Validate for ManagerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_provider.trim().is_empty() {
            return Err("default_provider cannot be empty".to_string());
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(format!(
                "max_retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT, self.max_retries
            ));
        }
        if self.retry_backoff.is_zero() {
            return Err("retry_backoff must be greater than 0".to_string());
        }
        if !self.retry_backoff_multiplier.is_finite() || self.retry_backoff_multiplier < 1.0 {
            return Err(format!(
                "retry_backoff_multiplier must be a finite number >= 1.0, got {}",
                self.retry_backoff_multiplier
            ));
        }
        if self.default_timeout.is_zero() {
            return Err("default_timeout must be greater than 0".to_string());
        }
        if self.health_check_interval.is_zero() {
            return Err("health_check_interval must be greater than 0".to_string());
        }
        if self.health_check_timeout.is_zero() {
            return Err("health_check_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}
