//! Core LLM Provider trait definitions
//!
//! Defines the unified interface every upstream vendor implements.

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{
    ChatRequest, ChatResponse, ChatStreamResponse, ProviderCapabilities, RequestContext,
    StreamSummary, VisionRequest, VisionResponse,
};

/// Unified LLM Provider interface
///
/// Implementations perform the vendor HTTP exchange and translate every failure into a
/// [`ProviderError`] whose `is_retryable()` verdict drives the manager's retry loop.
///
/// # Streaming
///
/// `chat_stream` takes the sender by value. Before returning, an implementation sends exactly
/// one element with `done == true`, carrying `error` on failure or `finish_reason` on success,
/// and the returned `Result` mirrors that element. The channel handle is released when the
/// sender is dropped on return.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
///
/// #[async_trait]
/// impl Provider for MyProvider {
///     fn name(&self) -> &str {
///         "my_provider"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities::default()
///     }
///
///     // implement other required methods...
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Provider name, unique within a manager
    fn name(&self) -> &str;

    /// Chat completion
    async fn chat(
        &self,
        request: ChatRequest,
        context: &RequestContext,
    ) -> Result<ChatResponse, ProviderError>;

    /// Streaming chat completion
    async fn chat_stream(
        &self,
        request: ChatRequest,
        context: &RequestContext,
        sender: mpsc::Sender<ChatStreamResponse>,
    ) -> Result<StreamSummary, ProviderError>;

    /// Image + text analysis
    async fn analyze(
        &self,
        request: VisionRequest,
        context: &RequestContext,
    ) -> Result<VisionResponse, ProviderError> {
        let _ = (request, context);
        Err(ProviderError::not_supported(self.name(), "vision"))
    }

    /// Lightweight liveness probe; never panics
    async fn is_healthy(&self, context: &RequestContext) -> bool;

    /// Static capabilities, no I/O
    fn capabilities(&self) -> ProviderCapabilities;

    /// Release resources; idempotent. Later calls fail with `ProviderUnavailable`.
    async fn close(&self) -> Result<(), ProviderError>;
}
