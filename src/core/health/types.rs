//! Health status types

use serde::{Deserialize, Serialize};

/// Consecutive failures that take a provider out of rotation
pub const UNHEALTHY_THRESHOLD: u32 = 3;

/// Health status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Eligible for traffic
    Healthy,
    /// Skipped until the next recorded success
    Unhealthy,
}

/// Where a health observation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    /// A real request served by the provider
    Traffic,
    /// The background prober
    Probe,
}
