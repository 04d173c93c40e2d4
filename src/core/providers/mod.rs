//! Upstream LLM providers
//!
//! Every vendor implements [`Provider`](crate::core::traits::Provider) on its own; the manager
//! only ever sees `Arc<dyn Provider>`.

pub mod base;

pub mod anthropic;
pub mod openai;

pub mod unified_provider;

#[cfg(test)]
pub(crate) mod scripted;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::GatewayConfig;
use crate::core::traits::Provider;
pub use unified_provider::ProviderError;

/// Registered providers keyed by name
pub type ProviderMap = HashMap<String, Arc<dyn Provider>>;

/// Provider type enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Custom(String),
}

impl From<&str> for ProviderType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "openai" => ProviderType::OpenAI,
            "anthropic" | "claude" => ProviderType::Anthropic,
            _ => ProviderType::Custom(s.to_string()),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Anthropic => write!(f, "anthropic"),
            ProviderType::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Build every provider the configuration enables
pub fn create_providers(config: &GatewayConfig) -> Result<ProviderMap, ProviderError> {
    let mut providers: ProviderMap = HashMap::new();

    if let Some(openai) = &config.openai {
        let provider = openai::OpenAIProvider::new(openai.clone())?;
        info!(provider = "openai", model = %openai.model, "Provider configured");
        providers.insert(ProviderType::OpenAI.to_string(), Arc::new(provider));
    }

    if let Some(anthropic) = &config.anthropic {
        let provider = anthropic::AnthropicProvider::new(anthropic.clone())?;
        info!(provider = "anthropic", model = %anthropic.model, "Provider configured");
        providers.insert(ProviderType::Anthropic.to_string(), Arc::new(provider));
    }

    Ok(providers)
}
