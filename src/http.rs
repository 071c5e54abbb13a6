//! HTTP client wrapper for talking to OAI-PMH repositories.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{HarvestError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("oai-harvester/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with appropriate timeout and user agent.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Perform one GET request against the repository.
///
/// The request is a single attempt; retry policy, if any, belongs to the
/// caller. A non-success status is a transport failure here, before the body
/// is ever inspected: protocol-level errors only exist inside successfully
/// delivered envelopes.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `base_url` - Repository base URL
/// * `params` - Query parameters, already filtered of empty values
///
/// # Returns
/// Raw bytes of the response body
pub fn fetch_bytes(client: &Client, base_url: &str, params: &[(&str, String)]) -> Result<Vec<u8>> {
    let response = client.get(base_url).query(params).send()?;

    let status = response.status();
    let url = response.url().to_string();
    tracing::debug!(status = %status, url = %url, "Fetched");

    if !status.is_success() {
        return Err(HarvestError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let bytes = response.bytes()?;
    Ok(bytes.to_vec())
}

/// Convert response bytes to a string, replacing invalid UTF-8.
///
/// Repositories occasionally serve mislabeled encodings; a lossy conversion
/// with a warning keeps the harvest going instead of failing outright.
pub fn bytes_to_string(bytes: &[u8], context: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(e) => {
            tracing::warn!(context, error = %e, "Response is not valid UTF-8, converting lossily");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
