//! Request context types
//!
//! A [`RequestContext`] travels with every gateway call. Besides tracing metadata it carries the
//! caller's cancellation token and optional deadline, which every upstream call and every retry
//! sleep honours.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, SystemTime};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::providers::unified_provider::ProviderError;

/// Request context for tracking, cancellation and deadlines
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID
    pub request_id: String,
    /// Start time
    pub start_time: SystemTime,
    /// Extra metadata
    pub metadata: HashMap<String, serde_json::Value>,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            start_time: SystemTime::now(),
            metadata: HashMap::new(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }
}

impl RequestContext {
    /// Create new request context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request ID
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Expire the context `timeout` from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Expire the context at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Bind the context to an externally owned cancellation token
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this context
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the context; every clone observes it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed().unwrap_or_default()
    }

    /// Fail fast if the context has already ended
    pub fn check(&self, provider: &str) -> Result<(), ProviderError> {
        if self.cancel.is_cancelled() {
            return Err(ProviderError::cancelled(provider, "request cancelled"));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ProviderError::deadline_exceeded(provider));
            }
        }
        Ok(())
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self, provider: &str) -> ProviderError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    ProviderError::cancelled(provider, "request cancelled")
                }
                _ = tokio::time::sleep_until(deadline) => {
                    ProviderError::deadline_exceeded(provider)
                }
            },
            None => {
                self.cancel.cancelled().await;
                ProviderError::cancelled(provider, "request cancelled")
            }
        }
    }

    /// Run `fut` unless the context ends first
    pub async fn run<T, F>(&self, provider: &str, fut: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        tokio::select! {
            biased;
            err = self.done(provider) => Err(err),
            result = fut => result,
        }
    }

    /// Sleep for `duration` unless the context ends first
    pub async fn sleep(&self, provider: &str, duration: Duration) -> Result<(), ProviderError> {
        self.run(provider, async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}
