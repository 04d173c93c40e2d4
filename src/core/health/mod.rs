//! Provider health tracking
//!
//! - `types` - Health status levels and the failure threshold
//! - `provider` - Per-provider health record and its transition rule
//! - `registry` - Shared registry written by traffic and by the prober
//! - `prober` - Background task that probes providers on an interval

pub mod prober;
pub mod provider;
pub mod registry;
pub mod types;

pub use prober::HealthProber;
pub use provider::ProviderHealth;
pub use registry::HealthRegistry;
pub use types::{HealthSignal, HealthStatus, UNHEALTHY_THRESHOLD};
