//! Upstream base URL validation

use url::Url;

/// Check that `url_str` is an absolute http(s) URL with a host
///
/// `context` names the setting in the error message.
pub fn validate_base_url(context: &str, url_str: &str) -> Result<(), String> {
    let url =
        Url::parse(url_str).map_err(|e| format!("{} base URL is invalid: {}", context, e))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "{} base URL must use http:// or https:// scheme, got: {}",
                context, scheme
            ));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("{} base URL must have a host", context));
    }

    Ok(())
}
