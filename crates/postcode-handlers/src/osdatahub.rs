// crates/postcode-handlers/src/osdatahub.rs
// ============================================================================
// Module: OS Data Hub Handler
// Description: Remote lookup against the OS Data Hub Names API.
// Purpose: Confirm a postcode through Ordnance Survey before decomposing it.
// Dependencies: postcode-core, reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! Issues `GET {endpoint}?key=...&query=...&maxresults=1`. A `200` response
//! is read as `results[0].GAZETTEER_ENTRY.NAME1` and re-validated through the
//! local grammar. A `401` means the API key was rejected; any other non-`200`
//! status is a generic [`PostcodeError::HandlerApi`].
//!
//! The API key is a credential: it is sent only as a query parameter and never
//! logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use postcode_core::Postcode;
use postcode_core::PostcodeError;
use postcode_core::PostcodeHandler;
use reqwest::Url;
use serde_json::Value;

use crate::http::DEFAULT_TIMEOUT;
use crate::http::LookupClient;
use crate::http::is_blank;
use crate::http::parse_endpoint;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Label used in errors and log events.
pub const OSDATAHUB_LABEL: &str = "OS Data Hub";
/// Default lookup endpoint.
pub const OSDATAHUB_ENDPOINT: &str = "https://api.os.uk/search/names/v1/find";
/// Message reported when the API key is rejected.
const INVALID_KEY_MESSAGE: &str = "Invalid API key provided for OS Data Hub.";

/// Settings for the OS Data Hub handler.
///
/// # Invariants
/// - `endpoint` is an `http` or `https` URL.
/// - `Debug` output redacts `api_key`.
#[derive(Clone, PartialEq, Eq)]
pub struct OsDataHubSettings {
    /// OS Data Hub API key.
    pub api_key: String,
    /// Lookup endpoint.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl OsDataHubSettings {
    /// Returns settings for the default endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: OSDATAHUB_ENDPOINT.to_string(),
            timeout,
        }
    }

    /// Returns default-timeout settings for the given key.
    #[must_use]
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_TIMEOUT)
    }
}

impl fmt::Debug for OsDataHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsDataHubSettings")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Resolves postcodes through the OS Data Hub Names API.
///
/// # Invariants
/// - Never constructs a [`Postcode`] directly.
#[derive(Clone)]
pub struct OsDataHubHandler {
    /// Parsed lookup endpoint without query parameters.
    endpoint: Url,
    /// OS Data Hub API key.
    api_key: String,
    /// Shared HTTP plumbing.
    client: LookupClient,
}

impl fmt::Debug for OsDataHubHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsDataHubHandler")
            .field("endpoint", &self.endpoint.as_str())
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl OsDataHubHandler {
    /// Creates a handler from settings.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] for an invalid endpoint or when the
    /// HTTP client cannot be built.
    pub fn new(settings: &OsDataHubSettings) -> Result<Self, PostcodeError> {
        Ok(Self {
            endpoint: parse_endpoint(OSDATAHUB_LABEL, &settings.endpoint)?,
            api_key: settings.api_key.clone(),
            client: LookupClient::new(OSDATAHUB_LABEL, settings.timeout)?,
        })
    }

    /// Builds the lookup URL for a postcode.
    fn lookup_url(&self, postcode: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("query", postcode)
            .append_pair("maxresults", "1");
        url
    }
}

impl PostcodeHandler for OsDataHubHandler {
    fn resolve(&self, postcode: &str) -> Result<Postcode, PostcodeError> {
        tracing::debug!(handler = OSDATAHUB_LABEL, postcode, "sending lookup request");
        let mut response = self.client.get(self.lookup_url(postcode))?;
        let status = response.status().as_u16();
        match status {
            200 => {}
            401 => {
                tracing::warn!(handler = OSDATAHUB_LABEL, status, "api key rejected");
                return Err(PostcodeError::api(
                    OSDATAHUB_LABEL,
                    status,
                    Some(INVALID_KEY_MESSAGE.to_string()),
                ));
            }
            _ => {
                tracing::warn!(handler = OSDATAHUB_LABEL, postcode, status, "lookup rejected");
                return Err(PostcodeError::api(OSDATAHUB_LABEL, status, None));
            }
        }
        let body = self.client.read_json(&mut response)?;
        let results = body.get("results");
        if is_blank(results) {
            return Err(PostcodeError::no_results(OSDATAHUB_LABEL, postcode));
        }
        let canonical = results
            .and_then(|results| results.get(0))
            .and_then(|entry| entry.get("GAZETTEER_ENTRY"))
            .and_then(|entry| entry.get("NAME1"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PostcodeError::internal("OS Data Hub result is missing 'GAZETTEER_ENTRY.NAME1'")
            })?;
        self.client.revalidate(canonical)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn lookup_url_carries_key_query_and_limit() {
        let handler = OsDataHubHandler::new(&OsDataHubSettings::with_key("secret")).unwrap();
        let url = handler.lookup_url("SW1A 1AA");
        assert_eq!(url.path(), "/search/names/v1/find");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("key".to_string(), "secret".to_string()),
                ("query".to_string(), "SW1A 1AA".to_string()),
                ("maxresults".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn constructors_fill_default_endpoint() {
        let settings = OsDataHubSettings::new("secret", Duration::from_secs(2));
        assert_eq!(settings.endpoint, OSDATAHUB_ENDPOINT);
        assert_eq!(settings.timeout, Duration::from_secs(2));
        assert_eq!(OsDataHubSettings::with_key("secret").timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let settings = OsDataHubSettings::with_key("secret");
        assert!(!format!("{settings:?}").contains("secret"));
        let handler = OsDataHubHandler::new(&settings).unwrap();
        assert!(!format!("{handler:?}").contains("secret"));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let settings = OsDataHubSettings {
            endpoint: "file:///etc/passwd".to_string(),
            ..OsDataHubSettings::with_key("secret")
        };
        assert!(OsDataHubHandler::new(&settings).is_err());
    }
}
