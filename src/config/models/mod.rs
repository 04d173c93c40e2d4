//! Configuration data models

pub mod gateway;

pub use crate::core::providers::anthropic::AnthropicConfig;
pub use crate::core::providers::openai::OpenAIConfig;
pub use crate::core::router::ManagerConfig;
pub use crate::utils::logging::{LogFormat, LoggingConfig};
pub use gateway::*;
