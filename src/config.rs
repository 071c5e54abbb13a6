//! Configuration constants and validation functions for the harvester.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HarvestError, Result};

/// Namespace of the OAI-PMH 2.0 response envelope.
pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";

/// Namespace of the Dublin Core metadata container (`oai_dc:dc`).
pub const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

/// HTTP timeout in seconds.
///
/// Set to 30 seconds to accommodate large list responses and slow
/// repositories.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Timestamp format required by the protocol for `from`/`until` filters
/// (UTC, second granularity).
pub const UTC_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Metadata prefix grammar from the protocol specification.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static METADATA_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_\.!~\*'\(\)]+$").expect("valid regex"));

/// Validate a repository base URL.
///
/// The client only speaks plain http(s), so anything else is rejected before
/// a request is attempted.
///
/// # Examples
/// ```
/// use oai_harvester::config::validate_base_url;
///
/// assert!(validate_base_url("http://eprints.ecs.soton.ac.uk/cgi/oai2").is_ok());
/// assert!(validate_base_url("ftp://example.org/oai").is_err());
/// assert!(validate_base_url("").is_err());
/// ```
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let rest = base_url
        .strip_prefix("https://")
        .or_else(|| base_url.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(HarvestError::InvalidBaseUrl(base_url.to_string())),
    }
}

/// Validate a metadata prefix against the protocol grammar.
///
/// # Examples
/// ```
/// use oai_harvester::config::validate_metadata_prefix;
///
/// assert!(validate_metadata_prefix("oai_dc").is_ok());
/// assert!(validate_metadata_prefix("oai dc").is_err());
/// ```
pub fn validate_metadata_prefix(prefix: &str) -> Result<()> {
    if METADATA_PREFIX_PATTERN.is_match(prefix) {
        Ok(())
    } else {
        Err(HarvestError::InvalidMetadataPrefix(prefix.to_string()))
    }
}

/// Format a date-time filter as the protocol's UTC timestamp.
///
/// Returns `None` for an unset filter so the parameter can be omitted from
/// the request entirely, never sent as an empty string or epoch.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use oai_harvester::config::format_utc_datetime;
///
/// let t = Utc.with_ymd_and_hms(2016, 3, 26, 18, 17, 43).unwrap();
/// assert_eq!(
///     format_utc_datetime(Some(t)),
///     Some("2016-03-26T18:17:43Z".to_string())
/// );
/// assert_eq!(format_utc_datetime(None), None);
/// ```
#[must_use]
pub fn format_utc_datetime(t: Option<DateTime<Utc>>) -> Option<String> {
    t.map(|t| t.format(UTC_DATETIME_FORMAT).to_string())
}
