//! Streaming plumbing shared by providers
//!
//! [`StreamSink`] owns the caller's sender for the lifetime of one provider stream and makes sure
//! exactly one terminal element is delivered. [`forward_sse`] drives a vendor SSE body through a
//! [`UnifiedSSEParser`] into a sink.

use std::time::Instant;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::core::cost::pricing::calculate_cost;
use crate::core::providers::base::sse::{SSETransformer, StreamFrame, UnifiedSSEParser};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{ChatStreamResponse, FinishReason, RequestContext, StreamSummary, Usage};

/// Sender wrapper for one provider stream
#[derive(Debug)]
pub struct StreamSink {
    sender: Option<mpsc::Sender<ChatStreamResponse>>,
    provider: String,
    model: String,
    chunks: usize,
}

impl StreamSink {
    pub fn new(
        sender: mpsc::Sender<ChatStreamResponse>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            sender: Some(sender),
            provider: provider.into(),
            model: model.into(),
            chunks: 0,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Replace the model once upstream reports the concrete one
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Content deltas forwarded so far
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Forward one content delta
    ///
    /// Fails with `Cancelled` when the receiver is gone; nothing more can be delivered then.
    pub async fn send_delta(&mut self, content: impl Into<String>) -> Result<(), ProviderError> {
        let content = content.into();
        if content.is_empty() {
            return Ok(());
        }
        let element = ChatStreamResponse::delta(&self.provider, &self.model, content);
        let Some(sender) = self.sender.as_ref() else {
            return Err(ProviderError::cancelled(&self.provider, "stream already finished"));
        };
        if sender.send(element).await.is_err() {
            self.sender = None;
            return Err(ProviderError::cancelled(&self.provider, "stream receiver dropped"));
        }
        self.chunks += 1;
        Ok(())
    }

    /// Deliver the successful terminal element and release the sender
    pub async fn finish(mut self, finish_reason: FinishReason, usage: Option<Usage>) {
        if let Some(sender) = self.sender.take() {
            let element =
                ChatStreamResponse::finished(&self.provider, &self.model, finish_reason, usage);
            let _ = sender.send(element).await;
        }
    }

    /// Deliver the failing terminal element, release the sender and hand the error back
    pub async fn fail(mut self, error: ProviderError) -> ProviderError {
        if let Some(sender) = self.sender.take() {
            let element = ChatStreamResponse::failed(&self.provider, &self.model, error.clone());
            let _ = sender.send(element).await;
        }
        error
    }
}

impl Drop for StreamSink {
    fn drop(&mut self) {
        // Dropped mid-stream (the provider future itself was cancelled): still terminate.
        let Some(sender) = self.sender.take() else {
            return;
        };
        let error = ProviderError::cancelled(&self.provider, "stream aborted");
        let element = ChatStreamResponse::failed(&self.provider, &self.model, error);

        match sender.try_send(element) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            // A full buffer must not swallow the terminal; wait for room off the drop path.
            Err(TrySendError::Full(element)) => match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        let _ = sender.send(element).await;
                    });
                }
                Err(_) => warn!(
                    provider = %self.provider,
                    "Stream dropped outside a runtime with a full buffer, terminal element lost"
                ),
            },
        }
    }
}

/// Accumulates usage reported piecewise across a stream
#[derive(Debug, Default)]
struct UsageAccumulator {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

impl UsageAccumulator {
    fn record(&mut self, prompt_tokens: Option<u32>, completion_tokens: Option<u32>) {
        if prompt_tokens.is_some() {
            self.prompt_tokens = prompt_tokens;
        }
        if completion_tokens.is_some() {
            self.completion_tokens = completion_tokens;
        }
    }

    fn usage(&self) -> Option<Usage> {
        if self.prompt_tokens.is_none() && self.completion_tokens.is_none() {
            return None;
        }
        Some(Usage::new(
            self.prompt_tokens.unwrap_or(0),
            self.completion_tokens.unwrap_or(0),
        ))
    }
}

/// Drive an SSE body into `sink` until the end marker, an error, or cancellation
///
/// A body that ends before the vendor's end marker counts as a failed stream.
pub async fn forward_sse<S, T>(
    mut body: S,
    mut parser: UnifiedSSEParser<T>,
    mut sink: StreamSink,
    context: &RequestContext,
) -> Result<StreamSummary, ProviderError>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
    T: SSETransformer,
{
    let started = Instant::now();
    let provider = sink.provider().to_string();
    let mut usage = UsageAccumulator::default();
    let mut finish_reason = None;

    loop {
        let next = tokio::select! {
            biased;
            err = context.done(&provider) => return Err(sink.fail(err).await),
            next = body.next() => next,
        };

        let frames = match next {
            Some(Ok(bytes)) => parser.process_bytes(&bytes),
            Some(Err(e)) => Err(ProviderError::provider_unavailable(
                &provider,
                format!("stream interrupted: {}", e),
            )),
            None => match parser.finish() {
                Ok(frames) if frames.contains(&StreamFrame::Done) => Ok(frames),
                Ok(_) => Err(ProviderError::provider_unavailable(
                    &provider,
                    "stream ended before completion",
                )),
                Err(e) => Err(e),
            },
        };
        let frames = match frames {
            Ok(frames) => frames,
            Err(e) => return Err(sink.fail(e).await),
        };

        for frame in frames {
            match frame {
                StreamFrame::Model(model) => sink.set_model(model),
                StreamFrame::Delta(content) => {
                    if let Err(e) = sink.send_delta(content).await {
                        return Err(sink.fail(e).await);
                    }
                }
                StreamFrame::Usage {
                    prompt_tokens,
                    completion_tokens,
                } => usage.record(prompt_tokens, completion_tokens),
                StreamFrame::Finish(reason) => finish_reason = Some(reason),
                StreamFrame::Done => {
                    let usage = usage.usage();
                    let finish_reason = finish_reason.unwrap_or_default();
                    let summary = StreamSummary {
                        provider: provider.clone(),
                        model: sink.model().to_string(),
                        finish_reason,
                        usage,
                        cost: usage
                            .map(|u| calculate_cost(sink.model(), &u))
                            .unwrap_or(0.0),
                        chunks: sink.chunks(),
                        latency: started.elapsed(),
                        metadata: Default::default(),
                    };
                    debug!(
                        provider = %provider,
                        chunks = summary.chunks,
                        "stream completed"
                    );
                    sink.finish(finish_reason, usage).await;
                    return Ok(summary);
                }
            }
        }
    }
}
