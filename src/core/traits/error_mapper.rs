//! Error mapping
//!
//! Each vendor classifies its own failures. Mappers are stateless and implemented once per
//! provider; there is deliberately no shared default classification.

use crate::core::providers::unified_provider::ProviderError;

/// Converts vendor failures into [`ProviderError`]
pub trait ErrorMapper: Send + Sync + 'static {
    /// Map a non-2xx response
    ///
    /// `retry_after` is the parsed `retry-after` header, when present.
    fn map_http_error(
        &self,
        status_code: u16,
        response_body: &str,
        retry_after: Option<u64>,
    ) -> ProviderError;

    /// Map a transport failure (connect, TLS, read, client timeout)
    fn map_transport_error(&self, error: &reqwest::Error) -> ProviderError;

    /// Map a 2xx body that could not be decoded
    fn map_parse_error(&self, error: &serde_json::Error) -> ProviderError;
}

/// Parse a `retry-after` header given in whole seconds
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}
