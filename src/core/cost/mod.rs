//! Usage and cost accounting
//!
//! A static pricing table turns token usage into USD, and the [`CostTracker`] aggregates what
//! every successful call consumed, per provider and per calendar day.

pub mod pricing;
pub mod tracker;
pub mod types;

pub use pricing::{calculate_cost, get_model_pricing, priced_models};
pub use tracker::CostTracker;
pub use types::{DailyUsage, ModelPricing, ProviderUsage};
