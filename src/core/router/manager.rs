//! Provider manager
//!
//! Routes every call through the default provider first and, when fallback is enabled, through
//! the remaining providers in alphabetical order. Non-streaming calls are retried per provider
//! with exponential backoff; every outcome feeds the health registry and successful calls feed the
//! cost tracker.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::ManagerConfig;
use crate::config::{GatewayConfig, Validate};
use crate::core::cost::CostTracker;
use crate::core::health::{HealthProber, HealthRegistry, HealthSignal, ProviderHealth};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::providers::{ProviderMap, create_providers};
use crate::core::traits::Provider;
use crate::core::types::{
    ChatRequest, ChatResponse, ChatStreamResponse, Metered, ProviderCapabilities,
    RequestContext, ResponseMetadata, StreamSummary, VisionRequest, VisionResponse,
};
use crate::utils::error::{GatewayError, Result};

const MANAGER: &str = "manager";

/// Multi-provider manager
///
/// `Send + Sync`; share it behind an `Arc`. Owns the background health prober, which stops on
/// [`Manager::close`] or when the manager is dropped.
pub struct Manager {
    config: ManagerConfig,
    providers: Arc<ProviderMap>,
    health: Arc<HealthRegistry>,
    cost_tracker: Arc<CostTracker>,
    prober: HealthProber,
    shutdown: CancellationToken,
    prober_task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("config", &self.config)
            .field("providers", &self.provider_names())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

impl Manager {
    /// Create a manager over `providers`
    ///
    /// Fails when the configuration is invalid, when two providers share a name, or when the
    /// default provider is not among them. The health prober is started when enabled and a tokio
    /// runtime is available.
    pub fn new<I>(config: ManagerConfig, providers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        config.validate().map_err(GatewayError::Config)?;

        let mut map: ProviderMap = HashMap::new();
        for provider in providers {
            let name = provider.name().to_string();
            if map.insert(name.clone(), provider).is_some() {
                return Err(GatewayError::config(format!(
                    "provider '{}' registered twice",
                    name
                )));
            }
        }
        if !map.contains_key(&config.default_provider) {
            return Err(GatewayError::config(format!(
                "default provider '{}' is not configured",
                config.default_provider
            )));
        }

        let providers = Arc::new(map);
        let health = Arc::new(HealthRegistry::new());
        for name in providers.keys() {
            health.register(name);
        }

        let shutdown = CancellationToken::new();
        let prober = HealthProber::new(
            Arc::clone(&providers),
            Arc::clone(&health),
            config.health_check_interval,
            config.health_check_timeout,
        );

        let prober_task = if config.enable_health_checks {
            match tokio::runtime::Handle::try_current() {
                Ok(_) => Some(prober.clone().spawn(shutdown.clone())),
                Err(_) => {
                    warn!("No tokio runtime available, background health checks disabled");
                    None
                }
            }
        } else {
            None
        };

        info!(
            providers = providers.len(),
            default_provider = %config.default_provider,
            fallback = config.enable_fallback,
            max_retries = config.max_retries,
            "Manager initialized"
        );

        Ok(Self {
            config,
            providers,
            health,
            cost_tracker: Arc::new(CostTracker::new()),
            prober,
            shutdown,
            prober_task: Mutex::new(prober_task),
            closed: AtomicBool::new(false),
        })
    }

    /// Build providers and manager from a loaded gateway configuration
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        config.validate().map_err(GatewayError::Config)?;
        let providers = create_providers(&config)?;
        Self::new(config.manager, providers.into_values())
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Chat completion with retry and fallback
    pub async fn chat(
        &self,
        request: ChatRequest,
        context: &RequestContext,
    ) -> std::result::Result<ChatResponse, ProviderError> {
        self.route("chat", context, |_| true, |provider: Arc<dyn Provider>| {
            let request = request.clone();
            async move { provider.chat(request, context).await }
        })
        .await
    }

    /// Image + text analysis; providers without vision support are skipped
    pub async fn analyze(
        &self,
        request: VisionRequest,
        context: &RequestContext,
    ) -> std::result::Result<VisionResponse, ProviderError> {
        self.route(
            "analyze",
            context,
            |capabilities| capabilities.supports_vision,
            |provider: Arc<dyn Provider>| {
                let request = request.clone();
                async move { provider.analyze(request, context).await }
            },
        )
        .await
    }

    /// Streaming chat completion
    ///
    /// Streams are not retried. Every provider that is tried delivers its own terminal element
    /// into `sender`; when no provider could be tried the manager sends a single
    /// `done + error` element itself. The caller's channel closes once this returns and every
    /// clone of `sender` is dropped.
    pub async fn chat_stream(
        &self,
        request: ChatRequest,
        context: &RequestContext,
        sender: mpsc::Sender<ChatStreamResponse>,
    ) -> std::result::Result<StreamSummary, ProviderError> {
        let mut tried = Vec::new();
        let mut last_error = None;

        let outcome = 'route: {
            if self.closed.load(Ordering::SeqCst) {
                break 'route Err(Self::closed_error());
            }

            for name in self.try_order() {
                if let Err(e) = context.check(&name) {
                    break 'route Err(e);
                }
                let Some(provider) = self.candidate(&name, "chat_stream", |capabilities| {
                    capabilities.supports_streaming
                }) else {
                    continue;
                };

                tried.push(name.clone());
                debug!(provider = %name, request_id = %context.request_id, "Starting stream");
                match provider
                    .chat_stream(request.clone(), context, sender.clone())
                    .await
                {
                    Ok(mut summary) => {
                        if self.config.enable_cost_tracking {
                            if let Some(usage) = &summary.usage {
                                self.cost_tracker.track(&name, usage, summary.cost);
                            }
                        }
                        self.health
                            .record_success(&name, summary.latency, HealthSignal::Traffic);
                        summary.metadata = self.metadata(&name, tried.len() as u32, &tried);
                        info!(
                            provider = %name,
                            chunks = summary.chunks,
                            request_id = %context.request_id,
                            "Stream completed"
                        );
                        return Ok(summary);
                    }
                    Err(e) if e.is_context_error() => return Err(e),
                    Err(e) => {
                        self.health.record_error(&name);
                        if !self.config.enable_fallback {
                            error!(provider = %name, error = %e, "Stream failed, fallback disabled");
                            return Err(ProviderError::all_providers_failed(vec![name], e));
                        }
                        warn!(provider = %name, error = %e, "Stream failed, trying next provider");
                        last_error = Some(e);
                    }
                }
            }

            match last_error {
                Some(e) => {
                    error!(attempted = ?tried, error = %e, "All providers failed to stream");
                    return Err(ProviderError::all_providers_failed(tried, e));
                }
                None => Err(ProviderError::NoProvidersAvailable),
            }
        };

        // Nothing was sent on this path unless some provider already ran
        match outcome {
            Err(e) if tried.is_empty() => {
                let _ = sender
                    .send(ChatStreamResponse::failed(MANAGER, "", e.clone()))
                    .await;
                Err(e)
            }
            other => other,
        }
    }

    /// Health record of one provider
    pub fn get_provider_health(&self, provider: &str) -> Option<ProviderHealth> {
        self.health.get(provider)
    }

    pub fn get_all_provider_health(&self) -> HashMap<String, ProviderHealth> {
        self.health.snapshot()
    }

    pub fn get_cost_tracker(&self) -> &CostTracker {
        &self.cost_tracker
    }

    /// Registered provider names, sorted
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Providers currently considered healthy, sorted
    pub fn available_providers(&self) -> Vec<String> {
        self.provider_names()
            .into_iter()
            .filter(|name| self.health.is_healthy(name))
            .collect()
    }

    pub fn capabilities(&self, provider: &str) -> Option<ProviderCapabilities> {
        self.providers.get(provider).map(|p| p.capabilities())
    }

    /// Probe every provider once, right now
    pub async fn probe_health_now(&self) {
        self.prober.probe_all(&self.shutdown).await;
    }

    /// Stop the prober and close every provider
    ///
    /// Idempotent. Later calls fail with `ProviderUnavailable`. Returns the first provider close
    /// error, after attempting all of them.
    pub async fn close(&self) -> std::result::Result<(), ProviderError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.shutdown.cancel();
        let task = self.prober_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Health prober task ended abnormally");
            }
        }

        let mut first_error = None;
        for name in self.provider_names() {
            if let Some(provider) = self.providers.get(&name) {
                if let Err(e) = provider.close().await {
                    warn!(provider = %name, error = %e, "Failed to close provider");
                    first_error.get_or_insert(e);
                }
            }
        }

        info!("Manager closed");
        first_error.map_or(Ok(()), Err)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn health_registry(&self) -> &HealthRegistry {
        &self.health
    }

    /// Default provider first, then the rest alphabetically when fallback is enabled
    fn try_order(&self) -> Vec<String> {
        let mut order = vec![self.config.default_provider.clone()];
        if self.config.enable_fallback {
            order.extend(
                self.provider_names()
                    .into_iter()
                    .filter(|name| *name != self.config.default_provider),
            );
        }
        order
    }

    /// Provider `name` if it is registered, healthy and passes `eligible`
    fn candidate(
        &self,
        name: &str,
        operation: &str,
        eligible: impl Fn(&ProviderCapabilities) -> bool,
    ) -> Option<&Arc<dyn Provider>> {
        let Some(provider) = self.providers.get(name) else {
            debug!(provider = %name, "Skipping unregistered provider");
            return None;
        };
        if !self.health.is_healthy(name) {
            warn!(provider = %name, operation, "Skipping unhealthy provider");
            return None;
        }
        if !eligible(&provider.capabilities()) {
            debug!(provider = %name, operation, "Skipping provider without required capability");
            return None;
        }
        Some(provider)
    }

    fn metadata(&self, provider: &str, attempts: u32, tried: &[String]) -> ResponseMetadata {
        ResponseMetadata {
            provider: provider.to_string(),
            attempts,
            used_fallback: provider != self.config.default_provider,
            providers_tried: tried.to_vec(),
        }
    }

    fn closed_error() -> ProviderError {
        ProviderError::provider_unavailable(MANAGER, "manager is closed")
    }

    async fn route<T, F, Fut>(
        &self,
        operation: &'static str,
        context: &RequestContext,
        eligible: impl Fn(&ProviderCapabilities) -> bool,
        call: F,
    ) -> std::result::Result<T, ProviderError>
    where
        T: Metered,
        F: Fn(Arc<dyn Provider>) -> Fut,
        Fut: Future<Output = std::result::Result<T, ProviderError>>,
    {
        if self.is_closed() {
            return Err(Self::closed_error());
        }

        let policy = self.config.retry_policy();
        let mut tried = Vec::new();
        let mut attempts = 0;
        let mut last_error = None;

        for name in self.try_order() {
            context.check(&name)?;
            let Some(provider) = self.candidate(&name, operation, &eligible) else {
                continue;
            };

            tried.push(name.clone());
            debug!(
                provider = %name,
                operation,
                request_id = %context.request_id,
                "Routing request"
            );

            let outcome = policy
                .execute(&name, context, |_| call(Arc::clone(provider)))
                .await;
            attempts += outcome.attempts;

            match outcome.result {
                Ok(mut response) => {
                    if self.config.enable_cost_tracking {
                        self.cost_tracker
                            .track(&name, response.usage(), response.cost());
                    }
                    self.health
                        .record_success(&name, response.latency(), HealthSignal::Traffic);
                    response.set_metadata(self.metadata(&name, attempts, &tried));
                    debug!(provider = %name, operation, attempts, "Request succeeded");
                    return Ok(response);
                }
                Err(e) if e.is_context_error() => return Err(e),
                Err(e) => {
                    self.health.record_error(&name);
                    if !self.config.enable_fallback {
                        error!(
                            provider = %name,
                            operation,
                            attempts,
                            error = %e,
                            "Request failed, fallback disabled"
                        );
                        return Err(ProviderError::all_providers_failed(vec![name], e));
                    }
                    warn!(
                        provider = %name,
                        operation,
                        error = %e,
                        "Provider failed, trying next provider"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => {
                error!(operation, attempted = ?tried, error = %e, "All providers failed");
                Err(ProviderError::all_providers_failed(tried, e))
            }
            None => {
                error!(operation, "No provider available");
                Err(ProviderError::NoProvidersAvailable)
            }
        }
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
