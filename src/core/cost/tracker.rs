//! In-memory usage and cost tracker

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::types::{DailyUsage, ProviderUsage};
use crate::core::types::Usage;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default)]
struct Ledger {
    providers: HashMap<String, ProviderUsage>,
    daily: HashMap<String, DailyUsage>,
}

/// Aggregates token usage and USD cost per provider and per calendar day
///
/// Counters only grow. Nothing is persisted; a restart starts from zero.
#[derive(Debug, Default)]
pub struct CostTracker {
    ledger: RwLock<Ledger>,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful request against today's bucket
    pub fn track(&self, provider: &str, usage: &Usage, cost: f64) {
        self.track_on(Local::now().date_naive(), provider, usage, cost);
    }

    /// Record one successful request against the bucket of `date`
    pub fn track_on(&self, date: NaiveDate, provider: &str, usage: &Usage, cost: f64) {
        let cost = if cost.is_finite() && cost > 0.0 {
            cost
        } else {
            if cost != 0.0 {
                warn!(provider = %provider, cost, "Discarding invalid cost");
            }
            0.0
        };
        let date = date.format(DATE_FORMAT).to_string();

        let mut ledger = self.ledger.write();
        ledger
            .providers
            .entry(provider.to_string())
            .or_default()
            .record(usage, cost);
        ledger
            .daily
            .entry(date.clone())
            .or_insert_with(|| DailyUsage::new(date))
            .record(provider, usage, cost);

        debug!(
            provider = %provider,
            total_tokens = usage.total_tokens,
            cost,
            "Tracked usage"
        );
    }

    /// Usage of one provider; zeroed if it never served a request
    pub fn get_provider_usage(&self, provider: &str) -> ProviderUsage {
        self.ledger
            .read()
            .providers
            .get(provider)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_all_provider_usage(&self) -> HashMap<String, ProviderUsage> {
        self.ledger.read().providers.clone()
    }

    /// Usage bucket of `date` (`YYYY-MM-DD`)
    pub fn get_daily_usage(&self, date: &str) -> Option<DailyUsage> {
        self.ledger.read().daily.get(date).cloned()
    }

    pub fn get_today_usage(&self) -> DailyUsage {
        let today = Local::now().date_naive().format(DATE_FORMAT).to_string();
        self.get_daily_usage(&today)
            .unwrap_or_else(|| DailyUsage::new(today))
    }

    /// USD across all providers
    pub fn total_cost(&self) -> f64 {
        self.ledger
            .read()
            .providers
            .values()
            .map(|usage| usage.total_cost)
            .sum()
    }

    pub fn total_requests(&self) -> u64 {
        self.ledger
            .read()
            .providers
            .values()
            .map(|usage| usage.total_requests)
            .sum()
    }
}
