//! OpenAI Provider Error Handling

use serde::Deserialize;

use crate::core::providers::unified_provider::ProviderError;
use crate::core::traits::ErrorMapper;

pub(crate) const PROVIDER_NAME: &str = "openai";

/// `{"error": {...}}` envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIErrorEnvelope {
    pub error: OpenAIErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAIErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Classifies OpenAI failures for one requested model
#[derive(Debug, Clone)]
pub struct OpenAIErrorMapper {
    model: String,
}

impl OpenAIErrorMapper {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl ErrorMapper for OpenAIErrorMapper {
    fn map_http_error(
        &self,
        status_code: u16,
        response_body: &str,
        retry_after: Option<u64>,
    ) -> ProviderError {
        let parsed = serde_json::from_str::<OpenAIErrorEnvelope>(response_body).ok();
        let message = parsed
            .as_ref()
            .map(|envelope| envelope.error.message.clone())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("HTTP {}: {}", status_code, response_body));
        let code = parsed
            .as_ref()
            .and_then(|envelope| envelope.error.code.as_deref().or(envelope.error.error_type.as_deref()))
            .unwrap_or_default();

        match status_code {
            401 | 403 => ProviderError::authentication(PROVIDER_NAME, message),
            404 => ProviderError::model_not_supported(PROVIDER_NAME, &self.model),
            400 | 422 => match code {
                "context_length_exceeded" => {
                    ProviderError::context_length_exceeded(PROVIDER_NAME, message)
                }
                "model_not_found" => ProviderError::model_not_supported(PROVIDER_NAME, &self.model),
                _ => ProviderError::invalid_request(PROVIDER_NAME, message),
            },
            429 => ProviderError::rate_limit_with_message(PROVIDER_NAME, message, retry_after),
            408 | 504 => ProviderError::timeout(PROVIDER_NAME, message),
            500..=599 => ProviderError::provider_unavailable(PROVIDER_NAME, message),
            _ => ProviderError::invalid_request(PROVIDER_NAME, message),
        }
    }

    fn map_transport_error(&self, error: &reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout(PROVIDER_NAME, error.to_string())
        } else {
            ProviderError::provider_unavailable(PROVIDER_NAME, error.to_string())
        }
    }

    fn map_parse_error(&self, error: &serde_json::Error) -> ProviderError {
        ProviderError::response_parsing(PROVIDER_NAME, error.to_string())
    }
}
