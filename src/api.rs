//! Weerlive API client
//!
//! Issues one GET per poll against the Weerlive endpoint and parses the
//! response into a [`Snapshot`]. The API has no proper error handling for a
//! wrong API key or an exhausted daily limit; both arrive as a plain text
//! message with HTTP 200 and are detected by sentinel substrings before any
//! JSON parsing. Retry policy lives in the coordinator, not here.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::snapshot::Snapshot;

/// Base URL of the Weerlive API.
const API_ENDPOINT: &str = "https://weerlive.nl/api/weerlive_api_v2.php";

/// Bound on a single poll request, connect through body.
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Sentinel in the response body for an invalid or missing API key.
const API_KEY_SENTINEL: &str = "Vraag eerst een API-key op";

/// Sentinel in the response body when the key's daily quota is used up.
const RATE_LIMIT_SENTINEL: &str = "Dagelijkse limiet";

/// A number field emitted as a bare underscore instead of null, which is
/// invalid JSON, see https://github.com/golles/ha-knmi/issues/130.
const BROKEN_NULL: &str = "\": _,";
const PATCHED_NULL: &str = "\": null,";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeerliveError {
    /// The request did not complete within the timeout.
    #[error("timeout error fetching information")]
    Timeout(#[source] reqwest::Error),

    /// Transport level failure: DNS, connect, TLS or body read.
    #[error("error fetching information: {0}")]
    Connection(#[source] reqwest::Error),

    /// The API rejected the key.
    #[error("the given API key is invalid")]
    ApiKey,

    /// The daily request limit for the key is exhausted.
    #[error("API key daily limit exceeded, try again tomorrow")]
    RateLimit,

    /// The response body was not valid JSON, even after patching.
    #[error("failed to parse weather data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the Weerlive weather API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    api_key: String,
    latitude: f64,
    longitude: f64,
}

impl ApiClient {
    /// Creates a client for the given API key and location.
    pub fn new(api_key: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            latitude,
            longitude,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}?key={}&locatie={},{}",
            API_ENDPOINT, self.api_key, self.latitude, self.longitude
        )
    }

    /// Fetches the current API response and parses it into a snapshot.
    pub async fn fetch(&self) -> Result<Snapshot, WeerliveError> {
        let response = self
            .client
            .get(self.endpoint())
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(classify_transport)?;

        let text = response.text().await.map_err(classify_transport)?;

        parse_response_text(&text)
    }
}

fn classify_transport(error: reqwest::Error) -> WeerliveError {
    if error.is_timeout() {
        WeerliveError::Timeout(error)
    } else {
        WeerliveError::Connection(error)
    }
}

/// Classifies sentinel error bodies and parses the JSON response.
///
/// Split from [`ApiClient::fetch`] so the sentinel and patch handling can be
/// exercised without a network.
fn parse_response_text(text: &str) -> Result<Snapshot, WeerliveError> {
    // The API has no proper error handling for a wrong API key or rate
    // limit; a 200 with a message is returned instead, detect that here.
    if text.contains(API_KEY_SENTINEL) {
        return Err(WeerliveError::ApiKey);
    }

    if text.contains(RATE_LIMIT_SENTINEL) {
        return Err(WeerliveError::RateLimit);
    }

    if text.contains(BROKEN_NULL) {
        log::debug!("Detected invalid JSON, attempting to fix that...");
        let patched = text.replace(BROKEN_NULL, PATCHED_NULL);
        return Ok(Snapshot::new(serde_json::from_str(&patched)?));
    }

    Ok(Snapshot::new(serde_json::from_str(text)?))
}
