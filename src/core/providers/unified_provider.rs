//! Unified Provider Error Handling
//!
//! Single error type shared by every provider and by the manager.
//!
//! | Variant | Purpose | Retryable |
//! |------|------|--------|
//! | ProviderUnavailable | Upstream down, 5xx, connection failure | Yes |
//! | RateLimit | Rate limit exceeded (429) | Yes |
//! | Authentication | Invalid or missing API key | No |
//! | ModelNotSupported | Unknown model | No |
//! | InvalidRequest | Malformed request | No |
//! | ContextLengthExceeded | Prompt too long for the model | No |
//! | Timeout | Upstream did not answer in time | Yes |
//! | NoProvidersAvailable | Every candidate was skipped | Yes |
//! | AllProvidersFailed | Every candidate failed | Yes |
//! | ResponseParsing | Upstream returned an unreadable body | No |
//! | NotSupported | Capability missing on the provider | No |
//! | Configuration | Provider misconfigured | No |
//! | Cancelled / DeadlineExceeded | Caller context ended | No |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use llm_gateway::ProviderError;
//!
//! let err = ProviderError::rate_limit("anthropic", Some(60));
//! if err.is_retryable() {
//!     if let Some(delay) = err.retry_after() {
//!         println!("Upstream asked for {} seconds", delay);
//!     }
//! }
//! ```

/// Unified provider error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider {provider} is unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: String,
        message: String,
        /// Seconds the upstream asked us to wait, when it said so
        retry_after: Option<u64>,
    },

    #[error("Authentication failed for {provider}: {message}")]
    Authentication { provider: String, message: String },

    #[error("Model '{model}' not supported by {provider}")]
    ModelNotSupported { provider: String, model: String },

    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest { provider: String, message: String },

    #[error("Context length exceeded for {provider}: {message}")]
    ContextLengthExceeded { provider: String, message: String },

    #[error("Timeout for {provider}: {message}")]
    Timeout { provider: String, message: String },

    #[error("No providers available")]
    NoProvidersAvailable,

    #[error("All providers failed (tried {attempted:?}): {source}")]
    AllProvidersFailed {
        attempted: Vec<String>,
        #[source]
        source: Box<ProviderError>,
    },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing { provider: String, message: String },

    #[error("Feature '{feature}' not supported by {provider}")]
    NotSupported { provider: String, feature: String },

    #[error("Configuration error for {provider}: {message}")]
    Configuration { provider: String, message: String },

    #[error("Operation cancelled for {provider}: {message}")]
    Cancelled { provider: String, message: String },

    #[error("Deadline exceeded for {provider}")]
    DeadlineExceeded { provider: String },
}

impl ProviderError {
    /// Create provider unavailable error
    pub fn provider_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create rate limit error
    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: match retry_after {
                Some(seconds) => format!("Rate limit exceeded. Retry after {} seconds", seconds),
                None => "Rate limit exceeded".to_string(),
            },
            retry_after,
        }
    }

    /// Create rate limit error with the upstream message
    pub fn rate_limit_with_message(
        provider: impl Into<String>,
        message: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: message.into(),
            retry_after,
        }
    }

    /// Create authentication error
    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create model not supported error
    pub fn model_not_supported(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self::ModelNotSupported {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Create invalid request error
    pub fn invalid_request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create context length exceeded error
    pub fn context_length_exceeded(
        provider: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ContextLengthExceeded {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create timeout error
    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap the last failure of an exhausted try-order
    pub fn all_providers_failed(attempted: Vec<String>, last_error: ProviderError) -> Self {
        Self::AllProvidersFailed {
            attempted,
            source: Box::new(last_error),
        }
    }

    /// Create response parsing error
    pub fn response_parsing(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create not supported error
    pub fn not_supported(provider: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::NotSupported {
            provider: provider.into(),
            feature: feature.into(),
        }
    }

    /// Create configuration error
    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create cancellation error
    pub fn cancelled(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cancelled {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create deadline exceeded error
    pub fn deadline_exceeded(provider: impl Into<String>) -> Self {
        Self::DeadlineExceeded {
            provider: provider.into(),
        }
    }

    /// Get the provider name that caused this error
    ///
    /// Aggregate errors report the provider of the wrapped cause; `NoProvidersAvailable`
    /// reports `"manager"`.
    pub fn provider(&self) -> &str {
        match self {
            Self::ProviderUnavailable { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::Authentication { provider, .. }
            | Self::ModelNotSupported { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::ContextLengthExceeded { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::NotSupported { provider, .. }
            | Self::Configuration { provider, .. }
            | Self::Cancelled { provider, .. }
            | Self::DeadlineExceeded { provider } => provider,
            Self::AllProvidersFailed { source, .. } => source.provider(),
            Self::NoProvidersAvailable => "manager",
        }
    }

    /// Check if this error is retryable
    ///
    /// Permanent failures (bad key, bad request, unknown model, oversized prompt) must not be
    /// retried even with retry budget remaining.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderUnavailable { .. }
            | Self::RateLimit { .. }
            | Self::Timeout { .. }
            | Self::NoProvidersAvailable
            | Self::AllProvidersFailed { .. } => true,

            Self::Authentication { .. }
            | Self::ModelNotSupported { .. }
            | Self::InvalidRequest { .. }
            | Self::ContextLengthExceeded { .. }
            | Self::ResponseParsing { .. }
            | Self::NotSupported { .. }
            | Self::Configuration { .. }
            | Self::Cancelled { .. }
            | Self::DeadlineExceeded { .. } => false,
        }
    }

    /// Whether the caller's context ended (cancellation or deadline)
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::DeadlineExceeded { .. })
    }

    /// Seconds the upstream asked us to wait before retrying
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            Self::AllProvidersFailed { source, .. } => source.retry_after(),
            _ => None,
        }
    }

    /// Short category name, used as a structured logging field
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::RateLimit { .. } => "rate_limit_exceeded",
            Self::Authentication { .. } => "invalid_api_key",
            Self::ModelNotSupported { .. } => "model_not_supported",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::ContextLengthExceeded { .. } => "context_length_exceeded",
            Self::Timeout { .. } => "timeout",
            Self::NoProvidersAvailable => "no_providers_available",
            Self::AllProvidersFailed { .. } => "all_providers_failed",
            Self::ResponseParsing { .. } => "response_parsing",
            Self::NotSupported { .. } => "not_supported",
            Self::Configuration { .. } => "configuration",
            Self::Cancelled { .. } => "cancelled",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
        }
    }

    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::RateLimit { .. } => 429,
            Self::ModelNotSupported { .. } => 404,
            Self::InvalidRequest { .. } | Self::Configuration { .. } => 400,
            Self::ContextLengthExceeded { .. } => 413,
            Self::NotSupported { .. } => 405,
            Self::Timeout { .. } | Self::DeadlineExceeded { .. } => 504,
            Self::ResponseParsing { .. } => 502,
            Self::Cancelled { .. } => 499,
            Self::ProviderUnavailable { .. } | Self::NoProvidersAvailable => 503,
            Self::AllProvidersFailed { source, .. } => source.http_status(),
        }
    }
}
