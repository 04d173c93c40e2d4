//! Static provider capability descriptions

use serde::{Deserialize, Serialize};

/// Vendor-side rate limits, informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RateLimits {
    pub requests_per_minute: u32,
    pub tokens_per_minute: u32,
}

/// What a provider can do; computed once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub supports_chat: bool,
    pub supports_streaming: bool,
    pub supports_vision: bool,
    pub supports_function_calling: bool,
    pub max_context_tokens: u32,
    pub max_output_tokens: u32,
    pub rate_limits: RateLimits,
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self {
            supports_chat: true,
            supports_streaming: false,
            supports_vision: false,
            supports_function_calling: false,
            max_context_tokens: 0,
            max_output_tokens: 0,
            rate_limits: RateLimits::default(),
        }
    }
}
