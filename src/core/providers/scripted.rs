//! Scripted in-process provider for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::core::cost::calculate_cost;
use crate::core::providers::unified_provider::ProviderError;
use crate::core::streaming::StreamSink;
use crate::core::traits::Provider;
use crate::core::types::{
    ChatRequest, ChatResponse, ChatStreamResponse, FinishReason, ProviderCapabilities,
    RequestContext, StreamSummary, Usage, VisionRequest, VisionResponse,
};

pub(crate) const SCRIPTED_MODEL: &str = "gpt-4o-mini";

/// What one call does
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Succeed,
    Fail(ProviderError),
    /// Never completes on its own; ends only with the context
    Hang,
}

#[derive(Debug)]
pub(crate) struct ScriptedProvider {
    name: String,
    script: Mutex<VecDeque<Outcome>>,
    otherwise: Outcome,
    vision: bool,
    healthy: AtomicBool,
    closed: AtomicBool,
    calls: AtomicU32,
    chunks: Vec<String>,
    fail_stream_after: Option<usize>,
    probe_delay: Duration,
}

impl ScriptedProvider {
    /// Succeeds on every call
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            otherwise: Outcome::Succeed,
            vision: false,
            healthy: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            calls: AtomicU32::new(0),
            chunks: vec!["Hel".to_string(), "lo".to_string(), "!".to_string()],
            fail_stream_after: None,
            probe_delay: Duration::ZERO,
        }
    }

    /// Fails every call with `error`
    pub(crate) fn failing(name: &str, error: ProviderError) -> Self {
        Self::new(name).otherwise(Outcome::Fail(error))
    }

    /// Outcomes consumed one per call before falling back to `otherwise`
    pub(crate) fn script(self, outcomes: Vec<Outcome>) -> Self {
        *self.script.lock() = outcomes.into();
        self
    }

    pub(crate) fn otherwise(mut self, outcome: Outcome) -> Self {
        self.otherwise = outcome;
        self
    }

    pub(crate) fn with_vision(mut self) -> Self {
        self.vision = true;
        self
    }

    pub(crate) fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    pub(crate) fn failing_stream_after(mut self, chunks: usize) -> Self {
        self.fail_stream_after = Some(chunks);
        self
    }

    /// Health probes take `delay` before answering
    pub(crate) fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn next_outcome(&self, context: &RequestContext) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return Err(ProviderError::provider_unavailable(&self.name, "closed"));
        }
        context.check(&self.name)?;

        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.otherwise.clone());
        match outcome {
            Outcome::Succeed => Ok(()),
            Outcome::Fail(error) => Err(error),
            Outcome::Hang => Err(context.done(&self.name).await),
        }
    }

    fn usage() -> Usage {
        Usage::new(100, 50)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        request: ChatRequest,
        context: &RequestContext,
    ) -> Result<ChatResponse, ProviderError> {
        self.next_outcome(context).await?;
        let model = request.model_or(SCRIPTED_MODEL).to_string();
        let usage = Self::usage();
        Ok(ChatResponse {
            id: format!("{}-{}", self.name, self.calls()),
            content: format!("{} says hi", self.name),
            usage,
            cost: calculate_cost(&model, &usage),
            provider: self.name.clone(),
            model,
            latency: Duration::from_millis(20),
            finish_reason: FinishReason::Stop,
            metadata: Default::default(),
        })
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        context: &RequestContext,
        sender: mpsc::Sender<ChatStreamResponse>,
    ) -> Result<StreamSummary, ProviderError> {
        let model = request.model_or(SCRIPTED_MODEL).to_string();
        let mut sink = StreamSink::new(sender, &self.name, &model);
        if let Err(e) = self.next_outcome(context).await {
            return Err(sink.fail(e).await);
        }

        for (index, chunk) in self.chunks.iter().enumerate() {
            if self.fail_stream_after == Some(index) {
                let error = ProviderError::provider_unavailable(&self.name, "connection reset");
                return Err(sink.fail(error).await);
            }
            if let Err(e) = sink.send_delta(chunk.clone()).await {
                return Err(sink.fail(e).await);
            }
        }
        if self.fail_stream_after == Some(self.chunks.len()) {
            let error = ProviderError::provider_unavailable(&self.name, "connection reset");
            return Err(sink.fail(error).await);
        }

        let usage = Self::usage();
        let summary = StreamSummary {
            provider: self.name.clone(),
            model: model.clone(),
            finish_reason: FinishReason::Stop,
            usage: Some(usage),
            cost: calculate_cost(&model, &usage),
            chunks: sink.chunks(),
            latency: Duration::from_millis(20),
            metadata: Default::default(),
        };
        sink.finish(FinishReason::Stop, Some(usage)).await;
        Ok(summary)
    }

    async fn analyze(
        &self,
        request: VisionRequest,
        context: &RequestContext,
    ) -> Result<VisionResponse, ProviderError> {
        if !self.vision {
            return Err(ProviderError::not_supported(&self.name, "vision"));
        }
        self.next_outcome(context).await?;
        let model = request.model_or(SCRIPTED_MODEL).to_string();
        let usage = Self::usage();
        Ok(VisionResponse {
            id: format!("{}-vision", self.name),
            content: format!("{} sees {} image(s)", self.name, request.images.len()),
            usage,
            cost: calculate_cost(&model, &usage),
            provider: self.name.clone(),
            model,
            latency: Duration::from_millis(30),
            finish_reason: FinishReason::Stop,
            metadata: Default::default(),
        })
    }

    async fn is_healthy(&self, context: &RequestContext) -> bool {
        if !self.probe_delay.is_zero()
            && context.sleep(&self.name, self.probe_delay).await.is_err()
        {
            return false;
        }
        !self.is_closed() && self.healthy.load(Ordering::SeqCst)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_streaming: true,
            supports_vision: self.vision,
            max_context_tokens: 8192,
            max_output_tokens: 1024,
            ..Default::default()
        }
    }

    async fn close(&self) -> Result<(), ProviderError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
