//! OpenAI Provider
//!
//! Chat Completions API with bearer authentication.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::debug;

use super::config::OpenAIConfig;
use super::error::{OpenAIErrorMapper, PROVIDER_NAME};
use super::streaming::OpenAIStreamTransformer;
use super::transformer::{
    OpenAIChatResponse, into_completion, transform_chat_request, transform_vision_request,
};
use crate::core::providers::base::{UnifiedSSEParser, build_http_client, join_url};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::streaming::{StreamSink, forward_sse};
use crate::core::traits::{ErrorMapper, Provider, ProviderConfig, parse_retry_after};
use crate::core::types::{
    ChatRequest, ChatResponse, ChatStreamResponse, ProviderCapabilities, RateLimits,
    RequestContext, StreamSummary, VisionRequest, VisionResponse,
};

/// OpenAI provider implementation
#[derive(Debug)]
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
    closed: AtomicBool,
}

impl OpenAIProvider {
    /// Create a provider from a validated configuration
    pub fn new(config: OpenAIConfig) -> Result<Self, ProviderError> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(PROVIDER_NAME, e))?;
        let client = build_http_client(PROVIDER_NAME, config.timeout())?;

        Ok(Self {
            config,
            client,
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn ensure_open(&self) -> Result<(), ProviderError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ProviderError::provider_unavailable(
                PROVIDER_NAME,
                "provider is closed",
            ));
        }
        Ok(())
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.bearer_auth(&self.config.api_key);
        match &self.config.organization {
            Some(organization) => builder.header("OpenAI-Organization", organization),
            None => builder,
        }
    }

    /// POST `body` and return the successful response, classifying failures
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        mapper: &OpenAIErrorMapper,
    ) -> Result<Response, ProviderError> {
        let url = join_url(&self.config.base_url, path);
        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| mapper.map_transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = parse_retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        debug!(provider = PROVIDER_NAME, status = status.as_u16(), "Upstream error response");
        Err(mapper.map_http_error(status.as_u16(), &text, retry_after))
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        mapper: &OpenAIErrorMapper,
    ) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body, mapper).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| mapper.map_transport_error(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| mapper.map_parse_error(&e))
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn chat(
        &self,
        request: ChatRequest,
        context: &RequestContext,
    ) -> Result<ChatResponse, ProviderError> {
        self.ensure_open()?;
        context.check(PROVIDER_NAME)?;

        let model = request.model_or(&self.config.model).to_string();
        let mapper = OpenAIErrorMapper::new(&model);
        let body = transform_chat_request(&request, &model, false);

        let started = Instant::now();
        let raw: OpenAIChatResponse = context
            .run(
                PROVIDER_NAME,
                self.post_json("chat/completions", &body, &mapper),
            )
            .await?;

        Ok(into_completion(raw, &model).into_chat_response(PROVIDER_NAME, started.elapsed()))
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        context: &RequestContext,
        sender: mpsc::Sender<ChatStreamResponse>,
    ) -> Result<StreamSummary, ProviderError> {
        let model = request.model_or(&self.config.model).to_string();
        let sink = StreamSink::new(sender, PROVIDER_NAME, &model);

        if let Err(e) = self.ensure_open().and_then(|_| context.check(PROVIDER_NAME)) {
            return Err(sink.fail(e).await);
        }

        let mapper = OpenAIErrorMapper::new(&model);
        let body = transform_chat_request(&request, &model, true);
        let response = match context
            .run(
                PROVIDER_NAME,
                self.post("chat/completions", &body, &mapper),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(sink.fail(e).await),
        };

        forward_sse(
            Box::pin(response.bytes_stream()),
            UnifiedSSEParser::new(OpenAIStreamTransformer),
            sink,
            context,
        )
        .await
    }

    async fn analyze(
        &self,
        request: VisionRequest,
        context: &RequestContext,
    ) -> Result<VisionResponse, ProviderError> {
        self.ensure_open()?;
        context.check(PROVIDER_NAME)?;
        if request.images.is_empty() {
            return Err(ProviderError::invalid_request(
                PROVIDER_NAME,
                "vision request carries no images",
            ));
        }

        let model = request.model_or(&self.config.model).to_string();
        let mapper = OpenAIErrorMapper::new(&model);
        let body = transform_vision_request(&request, &model);

        let started = Instant::now();
        let raw: OpenAIChatResponse = context
            .run(
                PROVIDER_NAME,
                self.post_json("chat/completions", &body, &mapper),
            )
            .await?;

        Ok(into_completion(raw, &model).into_vision_response(PROVIDER_NAME, started.elapsed()))
    }

    async fn is_healthy(&self, context: &RequestContext) -> bool {
        if self.ensure_open().is_err() {
            return false;
        }
        let url = join_url(&self.config.base_url, "models?limit=1");
        let probe = async {
            self.authorized(self.client.get(&url))
                .send()
                .await
                .map_err(|e| OpenAIErrorMapper::new(&self.config.model).map_transport_error(&e))
        };

        match context.run(PROVIDER_NAME, probe).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(provider = PROVIDER_NAME, error = %e, "Health probe failed");
                false
            }
        }
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_chat: true,
            supports_streaming: true,
            supports_vision: true,
            supports_function_calling: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
            rate_limits: RateLimits {
                requests_per_minute: 500,
                tokens_per_minute: 200_000,
            },
        }
    }

    async fn close(&self) -> Result<(), ProviderError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(provider = PROVIDER_NAME, "Provider closed");
        }
        Ok(())
    }
}
