//! Pinterest URL validation
//!
//! Accepts canonical Pinterest pin URLs on any of the supported country
//! domains, plus `pin.it` short links. Validation runs at the API boundary,
//! before the resolution pipeline is ever invoked.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Message returned when a URL does not match the Pinterest pattern
pub const PATTERN_MESSAGE: &str =
    "URL must be a valid Pinterest URL (e.g., pinterest.com/pin/... or pin.it/...)";

/// Message returned when the input is not a parseable URI at all
pub const URI_MESSAGE: &str = "URL must be a valid URI";

/// Message returned when the request body carries no URL
pub const REQUIRED_MESSAGE: &str = "URL is required";

// Host pattern is a compile-time constant, so a parse failure is a programmer
// error caught by the unit tests below.
#[allow(clippy::expect_used)]
static PINTEREST_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9-]+\.)*pinterest\.(?:com|fr|de|co\.uk|jp|ca|com\.au|au|it|es|ru)$")
        .expect("static host pattern must compile")
});

/// Validate that `raw` is an `http(s)` URL pointing at Pinterest or `pin.it`.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a user-facing message when the input is
/// not a URI or does not match the Pinterest domain pattern.
///
/// # Examples
///
/// ```
/// use pinterest_dl::validation::validate_pin_url;
///
/// assert!(validate_pin_url("https://www.pinterest.com/pin/1234567890/").is_ok());
/// assert!(validate_pin_url("https://pin.it/abc123").is_ok());
/// assert!(validate_pin_url("https://example.com/pin/1").is_err());
/// ```
pub fn validate_pin_url(raw: &str) -> Result<()> {
    let parsed = Url::parse(raw).map_err(|_| Error::Validation(URI_MESSAGE.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Validation(PATTERN_MESSAGE.to_string()));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| Error::Validation(PATTERN_MESSAGE.to_string()))?
        .to_ascii_lowercase();

    if host == "pin.it" || PINTEREST_HOST.is_match(&host) {
        return Ok(());
    }

    Err(Error::Validation(PATTERN_MESSAGE.to_string()))
}
