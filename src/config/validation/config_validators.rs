//! Gateway configuration validator

use super::trait_def::Validate;
use crate::config::models::GatewayConfig;
use crate::core::traits::ProviderConfig;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        self.manager.validate()?;

        if let Some(openai) = &self.openai {
            openai.validate()?;
        }
        if let Some(anthropic) = &self.anthropic {
            anthropic.validate()?;
        }

        let configured = self.configured_providers();
        if configured.is_empty() {
            return Err("no provider configured, set OPENAI_API_KEY or ANTHROPIC_API_KEY".to_string());
        }
        if !configured.contains(&self.manager.default_provider) {
            return Err(format!(
                "default provider '{}' is not configured (configured: {})",
                self.manager.default_provider,
                configured.join(", ")
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err("log level cannot be empty".to_string());
        }

        Ok(())
    }
}
