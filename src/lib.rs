//! # llm-gateway
//!
//! A multi-provider LLM gateway: one interface over OpenAI and Anthropic with bounded retry,
//! provider fallback, health tracking and per-provider cost accounting.
//!
//! ## Features
//!
//! - **Unified Interface**: chat, streaming chat and image analysis through one [`Manager`]
//! - **Retry and Fallback**: exponential backoff per provider, then the next provider
//! - **Health Tracking**: providers leave rotation after 3 consecutive failures and return on
//!   the next success, from traffic or from the background prober
//! - **Cost Tracking**: token usage and USD cost per provider and per day
//! - **Cancellation**: every call honours the caller's cancellation token and deadline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_gateway::{ChatMessage, ChatRequest, GatewayConfig, Manager, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Manager::from_config(GatewayConfig::from_env()?)?;
//!
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("You are a helpful assistant."),
//!         ChatMessage::user("Hello, how are you?"),
//!     ]);
//!     let response = manager.chat(request, &RequestContext::new()).await?;
//!     println!("{} ({}): {}", response.provider, response.model, response.content);
//!
//!     manager.close().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::{GatewayConfig, Validate};
pub use utils::error::{GatewayError, Result};
pub use utils::logging::{LoggingConfig, init_logging};

pub use crate::core::cost::{CostTracker, DailyUsage, ModelPricing, ProviderUsage};
pub use crate::core::health::{HealthStatus, ProviderHealth};
pub use crate::core::providers::anthropic::{AnthropicConfig, AnthropicProvider};
pub use crate::core::providers::openai::{OpenAIConfig, OpenAIProvider};
pub use crate::core::providers::{ProviderError, ProviderType};
pub use crate::core::router::{Manager, ManagerConfig, RetryPolicy};
pub use crate::core::traits::Provider;
pub use crate::core::types::{
    ChatMessage, ChatRequest, ChatResponse, ChatStreamResponse, FinishReason, ImageInput,
    MessageRole, ProviderCapabilities, RequestContext, ResponseMetadata, StreamSummary, Usage,
    VisionRequest, VisionResponse,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Crate description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
