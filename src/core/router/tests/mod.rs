//! Router tests module
//!
//! Every test drives the manager with in-process scripted providers.


use std::sync::Arc;
use std::time::Duration;

use crate::core::providers::scripted::ScriptedProvider;
use crate::core::router::{Manager, ManagerConfig};
use crate::core::traits::Provider;
use crate::core::types::{ChatMessage, ChatRequest};

pub(crate) const BACKOFF: Duration = Duration::from_millis(100);

/// Fast, prober-less configuration with "openai" as the default
pub(crate) fn test_config() -> ManagerConfig {
    ManagerConfig::default()
        .with_default_provider("openai")
        .with_max_retries(3)
        .with_retry_backoff(BACKOFF, 2.0)
        .with_health_checks(false)
}

pub(crate) fn build_manager(config: ManagerConfig, providers: &[Arc<ScriptedProvider>]) -> Manager {
    let providers = providers
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn Provider>);
    Manager::new(config, providers).expect("valid manager")
}

pub(crate) fn hello() -> ChatRequest {
    ChatRequest::new(vec![ChatMessage::user("Hello")])
}
