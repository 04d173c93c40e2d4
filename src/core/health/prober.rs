//! Background health prober

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::registry::HealthRegistry;
use super::types::HealthSignal;
use crate::core::providers::ProviderMap;
use crate::core::types::RequestContext;

/// Periodically probes every provider and feeds the verdict into the registry
#[derive(Clone)]
pub struct HealthProber {
    providers: Arc<ProviderMap>,
    registry: Arc<HealthRegistry>,
    interval: Duration,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(
        providers: Arc<ProviderMap>,
        registry: Arc<HealthRegistry>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            providers,
            registry,
            interval,
            timeout,
        }
    }

    /// Probe every provider once, concurrently, each bounded by the probe timeout
    pub async fn probe_all(&self, shutdown: &CancellationToken) {
        let probes = self.providers.iter().map(|(name, provider)| {
            let context = RequestContext::new()
                .with_timeout(self.timeout)
                .with_cancellation_token(shutdown.child_token());
            async move {
                let started = Instant::now();
                let healthy = tokio::time::timeout(self.timeout, provider.is_healthy(&context))
                    .await
                    .unwrap_or(false);
                (name, healthy, started.elapsed())
            }
        });

        let results = join_all(probes).await;
        // Probes cut short by shutdown say nothing about the providers
        if shutdown.is_cancelled() {
            debug!("Shutdown during health probes, results discarded");
            return;
        }

        for (name, healthy, elapsed) in results {
            debug!(provider = %name, healthy, elapsed_ms = elapsed.as_millis() as u64, "Health probe");
            if healthy {
                self.registry
                    .record_success(name, elapsed, HealthSignal::Probe);
            } else {
                self.registry.record_error(name);
            }
        }
    }

    /// Run until `shutdown` is cancelled; the first probe fires one interval after start
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.interval;
            let mut ticker = interval_at(start, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                providers = self.providers.len(),
                interval_secs = self.interval.as_secs(),
                "Health prober started"
            );

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => self.probe_all(&shutdown).await,
                }
            }

            info!("Health prober stopped");
        })
    }
}
