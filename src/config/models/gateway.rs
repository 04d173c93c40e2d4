//! Top-level gateway configuration

use serde::{Deserialize, Serialize};

use super::{AnthropicConfig, LoggingConfig, ManagerConfig, OpenAIConfig};
use crate::core::providers::ProviderType;

/// Everything needed to build a [`Manager`](crate::core::router::Manager)
///
/// A provider section is `None` when that provider is not configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub manager: ManagerConfig,
    pub openai: Option<OpenAIConfig>,
    pub anthropic: Option<AnthropicConfig>,
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Names of the configured providers
    pub fn configured_providers(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.openai.is_some() {
            names.push(ProviderType::OpenAI.to_string());
        }
        if self.anthropic.is_some() {
            names.push(ProviderType::Anthropic.to_string());
        }
        names
    }
}
