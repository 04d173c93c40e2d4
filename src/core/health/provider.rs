//! Provider health tracking

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{HealthSignal, HealthStatus, UNHEALTHY_THRESHOLD};

/// Health record of one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Provider identifier
    pub provider: String,
    pub is_healthy: bool,
    /// Consecutive failures since the last success
    pub health_check_failures: u32,
    /// Two-point moving average of observed latency
    #[serde(with = "crate::utils::duration::millis")]
    pub average_latency: Duration,
    /// Time of the last recorded observation, success or failure
    pub last_health_check: Option<DateTime<Utc>>,
    /// Successful traffic requests since registration
    pub requests_last_24h: u64,
}

impl ProviderHealth {
    /// Create new provider health tracking; providers start healthy
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            is_healthy: true,
            health_check_failures: 0,
            average_latency: Duration::ZERO,
            last_health_check: None,
            requests_last_24h: 0,
        }
    }

    pub fn status(&self) -> HealthStatus {
        if self.is_healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }

    /// Record a success; returns `true` if this recovered an unhealthy provider
    pub fn record_success(&mut self, latency: Duration, signal: HealthSignal) -> bool {
        let recovered = !self.is_healthy;

        self.is_healthy = true;
        self.health_check_failures = 0;
        self.average_latency = if self.average_latency.is_zero() {
            latency
        } else {
            (self.average_latency + latency) / 2
        };
        self.last_health_check = Some(Utc::now());
        if signal == HealthSignal::Traffic {
            self.requests_last_24h += 1;
        }

        recovered
    }

    /// Record a failure; returns `true` if this took the provider out of rotation
    pub fn record_error(&mut self) -> bool {
        self.health_check_failures = self.health_check_failures.saturating_add(1);
        self.last_health_check = Some(Utc::now());

        if self.is_healthy && self.health_check_failures >= UNHEALTHY_THRESHOLD {
            self.is_healthy = false;
            return true;
        }
        false
    }
}
