//! Provider configuration trait

use std::fmt::Debug;
use std::time::Duration;

/// Common accessors every provider configuration offers
///
/// Validation runs before a provider is constructed; a provider never sees an invalid config.
pub trait ProviderConfig: Send + Sync + Clone + Debug + 'static {
    /// `Ok(())` if the configuration is usable, `Err` with a message otherwise
    fn validate(&self) -> Result<(), String>;

    fn api_key(&self) -> &str;

    fn api_base(&self) -> &str;

    /// Default model used when a request names none
    fn default_model(&self) -> &str;

    /// HTTP client timeout
    fn timeout(&self) -> Duration;
}
