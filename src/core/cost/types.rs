//! Cost accounting types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::Usage;

/// Price of a model, USD per one million tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_per_1m: f64,
    pub output_per_1m: f64,
}

impl ModelPricing {
    pub const fn new(input_per_1m: f64, output_per_1m: f64) -> Self {
        Self {
            input_per_1m,
            output_per_1m,
        }
    }

    /// Cost of `usage` at this price
    pub fn cost_for(&self, usage: &Usage) -> f64 {
        (usage.prompt_tokens as f64 * self.input_per_1m
            + usage.completion_tokens as f64 * self.output_per_1m)
            / 1_000_000.0
    }
}

/// Cumulative usage of one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderUsage {
    pub total_requests: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// USD
    pub total_cost: f64,
}

impl ProviderUsage {
    pub(crate) fn record(&mut self, usage: &Usage, cost: f64) {
        self.total_requests += 1;
        self.prompt_tokens += u64::from(usage.prompt_tokens);
        self.completion_tokens += u64::from(usage.completion_tokens);
        self.total_tokens += u64::from(usage.total_tokens);
        self.total_cost += cost;
    }
}

/// Usage of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DailyUsage {
    /// `YYYY-MM-DD`, local clock
    pub date: String,
    pub total_requests: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub by_provider: HashMap<String, ProviderUsage>,
}

impl DailyUsage {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, provider: &str, usage: &Usage, cost: f64) {
        self.total_requests += 1;
        self.total_tokens += u64::from(usage.total_tokens);
        self.total_cost += cost;
        self.by_provider
            .entry(provider.to_string())
            .or_default()
            .record(usage, cost);
    }
}
