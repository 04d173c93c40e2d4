//! Bounded retry against a single provider
//!
//! The manager wraps every non-streaming provider call in [`RetryPolicy::execute`]. Retryable
//! errors are retried after an exponentially growing backoff; everything else returns at once.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::RequestContext;

/// Cap on a single backoff sleep
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Retry schedule for one provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Sleep before the first retry
    pub initial_backoff: Duration,
    /// Growth factor applied after every attempt
    pub multiplier: f64,
}

/// Result of [`RetryPolicy::execute`] together with the number of attempts made
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T, ProviderError>,
    /// Attempts actually started; 0 when the context had already ended
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), 2.0)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, multiplier: f64) -> Self {
        Self {
            max_retries,
            initial_backoff,
            multiplier,
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, 1.0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff following `current`, capped at [`MAX_BACKOFF`]
    pub fn next_backoff(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .map(|next| next.min(MAX_BACKOFF))
            .unwrap_or(MAX_BACKOFF)
    }

    /// Sleeps taken before each retry, in order
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        let mut backoff = self.initial_backoff.min(MAX_BACKOFF);
        (0..self.max_retries)
            .map(|_| {
                let current = backoff;
                backoff = self.next_backoff(backoff);
                current
            })
            .collect()
    }

    /// Run `operation` until it succeeds, fails permanently or attempts run out
    ///
    /// `operation` receives the 1-based attempt number. The context is checked before every
    /// attempt, each attempt races the context, and so does every backoff sleep; a context error
    /// is returned as soon as it is observed.
    pub async fn execute<T, F, Fut>(
        &self,
        provider: &str,
        context: &RequestContext,
        mut operation: F,
    ) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.max_attempts();
        let mut backoff = self.initial_backoff.min(MAX_BACKOFF);
        let mut attempts = 0;

        loop {
            if let Err(e) = context.check(provider) {
                return RetryOutcome {
                    result: Err(e),
                    attempts,
                };
            }

            attempts += 1;
            let error = match context.run(provider, operation(attempts)).await {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts,
                    };
                }
                Err(e) => e,
            };

            if error.is_context_error() || !error.is_retryable() || attempts >= max_attempts {
                debug!(
                    provider = %provider,
                    attempts,
                    retryable = error.is_retryable(),
                    error = %error,
                    "Giving up on provider"
                );
                return RetryOutcome {
                    result: Err(error),
                    attempts,
                };
            }

            warn!(
                provider = %provider,
                attempt = attempts,
                backoff_ms = backoff.as_millis() as u64,
                request_id = %context.request_id,
                error = %error,
                "Retrying after retryable error"
            );

            if let Err(e) = context.sleep(provider, backoff).await {
                return RetryOutcome {
                    result: Err(e),
                    attempts,
                };
            }
            backoff = self.next_backoff(backoff);
        }
    }
}
