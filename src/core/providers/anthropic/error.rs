//! Anthropic Provider Error Handling
//!
//! Anthropic reports a typed error (`authentication_error`, `rate_limit_error`, ...) both in
//! non-2xx bodies and as `error` events inside a stream; both paths share one classifier.

use serde::Deserialize;

use crate::core::providers::unified_provider::ProviderError;
use crate::core::traits::ErrorMapper;

pub(crate) const PROVIDER_NAME: &str = "anthropic";

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicErrorEnvelope {
    pub error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}

/// Classifies Anthropic failures for one requested model
#[derive(Debug, Clone)]
pub struct AnthropicErrorMapper {
    model: String,
}

impl AnthropicErrorMapper {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Classify a typed Anthropic error
    pub fn from_error_type(
        &self,
        error_type: &str,
        message: &str,
        retry_after: Option<u64>,
    ) -> Option<ProviderError> {
        let error = match error_type {
            "authentication_error" | "permission_error" => {
                ProviderError::authentication(PROVIDER_NAME, message)
            }
            "invalid_request_error" if is_context_overflow(message) => {
                ProviderError::context_length_exceeded(PROVIDER_NAME, message)
            }
            "invalid_request_error" => ProviderError::invalid_request(PROVIDER_NAME, message),
            "not_found_error" => ProviderError::model_not_supported(PROVIDER_NAME, &self.model),
            "rate_limit_error" => {
                ProviderError::rate_limit_with_message(PROVIDER_NAME, message, retry_after)
            }
            "overloaded_error" | "api_error" => {
                ProviderError::provider_unavailable(PROVIDER_NAME, message)
            }
            "timeout_error" => ProviderError::timeout(PROVIDER_NAME, message),
            _ => return None,
        };
        Some(error)
    }

    /// Classify a stream `error` event payload
    pub(crate) fn from_stream_error(&self, body: &AnthropicErrorBody) -> ProviderError {
        self.from_error_type(&body.error_type, &body.message, None)
            .unwrap_or_else(|| {
                ProviderError::provider_unavailable(
                    PROVIDER_NAME,
                    format!("{}: {}", body.error_type, body.message),
                )
            })
    }
}

fn is_context_overflow(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("prompt is too long") || message.contains("context window")
}

impl ErrorMapper for AnthropicErrorMapper {
    fn map_http_error(
        &self,
        status_code: u16,
        response_body: &str,
        retry_after: Option<u64>,
    ) -> ProviderError {
        if let Ok(envelope) = serde_json::from_str::<AnthropicErrorEnvelope>(response_body) {
            if let Some(error) = self.from_error_type(
                &envelope.error.error_type,
                &envelope.error.message,
                retry_after,
            ) {
                return error;
            }
        }

        let message = format!("HTTP {}: {}", status_code, response_body);
        match status_code {
            400 | 422 => ProviderError::invalid_request(PROVIDER_NAME, message),
            401 | 403 => ProviderError::authentication(PROVIDER_NAME, message),
            404 => ProviderError::model_not_supported(PROVIDER_NAME, &self.model),
            413 => ProviderError::context_length_exceeded(PROVIDER_NAME, message),
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
