//! Shared health registry

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::provider::ProviderHealth;
use super::types::HealthSignal;

/// Health records of every registered provider
///
/// Written by live traffic and by the prober through the same two operations, so both follow one
/// transition rule. Reads return clones.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    records: RwLock<HashMap<String, ProviderHealth>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `provider`; an existing record is kept
    pub fn register(&self, provider: &str) {
        self.records
            .write()
            .entry(provider.to_string())
            .or_insert_with(|| ProviderHealth::new(provider));
    }

    /// Unknown providers are reported unhealthy
    pub fn is_healthy(&self, provider: &str) -> bool {
        self.records
            .read()
            .get(provider)
            .is_some_and(|health| health.is_healthy)
    }

    pub fn record_success(&self, provider: &str, latency: Duration, signal: HealthSignal) {
        let mut records = self.records.write();
        let Some(health) = records.get_mut(provider) else {
            return;
        };
        if health.record_success(latency, signal) {
            info!(provider = %provider, ?signal, "Provider recovered");
        }
    }

    pub fn record_error(&self, provider: &str) {
        let mut records = self.records.write();
        let Some(health) = records.get_mut(provider) else {
            return;
        };
        if health.record_error() {
            warn!(
                provider = %provider,
                failures = health.health_check_failures,
                "Provider marked unhealthy"
            );
        }
    }

    pub fn get(&self, provider: &str) -> Option<ProviderHealth> {
        self.records.read().get(provider).cloned()
    }

    pub fn snapshot(&self) -> HashMap<String, ProviderHealth> {
        self.records.read().clone()
    }
}
