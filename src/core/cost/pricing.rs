//! Static model pricing table
//!
//! Prices are USD per one million tokens. Lookups match the exact model name first, then the
//! longest table key that prefixes it, so dated snapshots (`gpt-4o-2024-08-06`) resolve to their
//! family price.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::types::ModelPricing;
use crate::core::types::Usage;

static MODEL_PRICING: Lazy<HashMap<&'static str, ModelPricing>> = Lazy::new(|| {
    HashMap::from([
        // OpenAI
        ("gpt-4o", ModelPricing::new(2.5, 10.0)),
        ("gpt-4o-mini", ModelPricing::new(0.15, 0.6)),
        ("gpt-4-turbo", ModelPricing::new(10.0, 30.0)),
        ("gpt-4", ModelPricing::new(30.0, 60.0)),
        ("gpt-3.5-turbo", ModelPricing::new(0.5, 1.5)),
        // Anthropic
        ("claude-3-5-sonnet-20241022", ModelPricing::new(3.0, 15.0)),
        ("claude-3-5-haiku-20241022", ModelPricing::new(0.8, 4.0)),
        ("claude-3-opus-20240229", ModelPricing::new(15.0, 75.0)),
        ("claude-3-sonnet-20240229", ModelPricing::new(3.0, 15.0)),
        ("claude-3-haiku-20240307", ModelPricing::new(0.25, 1.25)),
    ])
});

/// Pricing for `model`, if known
pub fn get_model_pricing(model: &str) -> Option<ModelPricing> {
    let model = model.trim().to_lowercase();
    if let Some(pricing) = MODEL_PRICING.get(model.as_str()) {
        return Some(*pricing);
    }

    MODEL_PRICING
        .iter()
        .filter(|(key, _)| model.starts_with(*key))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, pricing)| *pricing)
}

/// USD cost of `usage` on `model`; zero for unknown models
pub fn calculate_cost(model: &str, usage: &Usage) -> f64 {
    get_model_pricing(model)
        .map(|pricing| pricing.cost_for(usage))
        .unwrap_or(0.0)
}

/// Models with a pricing entry, sorted
pub fn priced_models() -> Vec<&'static str> {
    let mut models: Vec<_> = MODEL_PRICING.keys().copied().collect();
    models.sort_unstable();
    models
}
