//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `base_url`: Upstream base URL checks
//! - `config_validators`: Gateway configuration validator

mod base_url;
mod config_validators;
mod trait_def;

pub use base_url::validate_base_url;
pub use trait_def::Validate;
