//! Response types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::providers::unified_provider::ProviderError;

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop
    #[default]
    Stop,
    /// Length limit reached
    Length,
    /// Tool call
    ToolCalls,
    /// Content filter
    ContentFilter,
    /// Anything the vendor reported that we do not model
    Other,
}

/// Token usage of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Always `prompt_tokens + completion_tokens`
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_tokens == 0
    }
}

/// Routing facts the manager attaches to every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResponseMetadata {
    /// Provider that served the response
    pub provider: String,
    /// Attempts across retries and fallbacks, including the successful one
    pub attempts: u32,
    /// Served by a provider other than the configured default
    pub used_fallback: bool,
    /// Providers invoked for this call, in order
    pub providers_tried: Vec<String>,
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub content: String,
    pub usage: Usage,
    /// USD, zero when the model has no pricing entry
    pub cost: f64,
    pub provider: String,
    /// Concrete model that produced the response
    pub model: String,
    #[serde(with = "crate::utils::duration::millis")]
    pub latency: Duration,
    pub finish_reason: FinishReason,
    #[serde(default)]
    pub metadata: ResponseMetadata,
}

/// Vision analysis response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionResponse {
    pub id: String,
    pub content: String,
    pub usage: Usage,
    pub cost: f64,
    pub provider: String,
    pub model: String,
    #[serde(with = "crate::utils::duration::millis")]
    pub latency: Duration,
    pub finish_reason: FinishReason,
    #[serde(default)]
    pub metadata: ResponseMetadata,
}

/// One element of a streamed chat completion
///
/// Content deltas have `done == false`. The last element of every stream has `done == true` and
/// carries either `finish_reason` (success) or `error` (failure).
#[derive(Debug, Clone, Default)]
pub struct ChatStreamResponse {
    pub content: String,
    pub done: bool,
    pub finish_reason: Option<FinishReason>,
    pub error: Option<ProviderError>,
    pub usage: Option<Usage>,
    pub provider: String,
    pub model: String,
}

impl ChatStreamResponse {
    pub fn delta(provider: &str, model: &str, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            provider: provider.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    pub fn finished(
        provider: &str,
        model: &str,
        finish_reason: FinishReason,
        usage: Option<Usage>,
    ) -> Self {
        Self {
            done: true,
            finish_reason: Some(finish_reason),
            usage,
            provider: provider.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    pub fn failed(provider: &str, model: &str, error: ProviderError) -> Self {
        Self {
            done: true,
            error: Some(error),
            provider: provider.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Outcome of a completed stream, returned alongside the terminal element
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    pub provider: String,
    pub model: String,
    pub finish_reason: FinishReason,
    pub usage: Option<Usage>,
    pub cost: f64,
    pub chunks: usize,
    pub latency: Duration,
    pub metadata: ResponseMetadata,
}

/// Responses the manager can account for and annotate
pub trait Metered {
    fn usage(&self) -> &Usage;
    fn cost(&self) -> f64;
    fn latency(&self) -> Duration;
    fn set_metadata(&mut self, metadata: ResponseMetadata);
}

macro_rules! impl_metered {
    ($($ty:ty),*) => {
        $(impl Metered for $ty {
            fn usage(&self) -> &Usage {
                &self.usage
            }

            fn cost(&self) -> f64 {
                self.cost
            }

            fn latency(&self) -> Duration {
                self.latency
            }

            fn set_metadata(&mut self, metadata: ResponseMetadata) {
                self.metadata = metadata;
            }
        })*
    };
}

impl_metered!(ChatResponse, VisionResponse);
