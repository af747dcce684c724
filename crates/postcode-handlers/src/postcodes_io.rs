// crates/postcode-handlers/src/postcodes_io.rs
// ============================================================================
// Module: Postcodes.io Handler
// Description: Remote lookup against the Postcodes.io REST API.
// Purpose: Confirm a postcode exists upstream before decomposing it locally.
// Dependencies: postcode-core, reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! Issues `GET {endpoint}/{postcode}` with the postcode as one
//! percent-encoded path segment. A `200` response carrying
//! `{"result": {"postcode": "..."}}` is re-validated through the local grammar.
//! Any other status is a [`PostcodeError::HandlerApi`]; a missing or empty
//! `result` is a [`PostcodeError::HandlerNoResults`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use postcode_core::Postcode;
use postcode_core::PostcodeError;
use postcode_core::PostcodeHandler;
use reqwest::Url;

use crate::http::DEFAULT_TIMEOUT;
use crate::http::LookupClient;
use crate::http::is_blank;
use crate::http::parse_endpoint;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Label used in errors and log events.
pub const POSTCODES_IO_LABEL: &str = "Postcodes.io";
/// Default lookup endpoint.
pub const POSTCODES_IO_ENDPOINT: &str = "https://api.postcodes.io/postcodes";

/// Settings for the Postcodes.io handler.
///
/// # Invariants
/// - `endpoint` is an `http` or `https` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostcodesIoSettings {
    /// Lookup endpoint; the postcode is appended as a path segment.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for PostcodesIoSettings {
    fn default() -> Self {
        Self {
            endpoint: POSTCODES_IO_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PostcodesIoSettings {
    /// Returns default settings with the given timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Resolves postcodes through Postcodes.io.
///
/// # Invariants
/// - Never constructs a [`Postcode`] directly.
#[derive(Debug, Clone)]
pub struct PostcodesIoHandler {
    /// Parsed lookup endpoint.
    endpoint: Url,
    /// Shared HTTP plumbing.
    client: LookupClient,
}

impl PostcodesIoHandler {
    /// Creates a handler from settings.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] for an invalid endpoint or when the
    /// HTTP client cannot be built.
    pub fn new(settings: &PostcodesIoSettings) -> Result<Self, PostcodeError> {
        Ok(Self {
            endpoint: parse_endpoint(POSTCODES_IO_LABEL, &settings.endpoint)?,
            client: LookupClient::new(POSTCODES_IO_LABEL, settings.timeout)?,
        })
    }

    /// Builds the lookup URL for a postcode.
    fn lookup_url(&self, postcode: &str) -> Result<Url, PostcodeError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| PostcodeError::internal("Postcodes.io endpoint cannot take a path"))?
            .pop_if_empty()
            .push(postcode);
        Ok(url)
    }
}

impl PostcodeHandler for PostcodesIoHandler {
    fn resolve(&self, postcode: &str) -> Result<Postcode, PostcodeError> {
        let url = self.lookup_url(postcode)?;
        tracing::debug!(handler = POSTCODES_IO_LABEL, postcode, "sending lookup request");
        let mut response = self.client.get(url)?;
        let status = response.status().as_u16();
        if status != 200 {
            tracing::warn!(handler = POSTCODES_IO_LABEL, postcode, status, "lookup rejected");
            return Err(PostcodeError::api(POSTCODES_IO_LABEL, status, None));
        }
        let body = self.client.read_json(&mut response)?;
        let result = body.get("result");
        if is_blank(result) {
            return Err(PostcodeError::no_results(POSTCODES_IO_LABEL, postcode));
        }
        let canonical = result
            .and_then(|result| result.get("postcode"))
            .and_then(|value| value.as_str())
            .ok_or_else(|| PostcodeError::internal("Postcodes.io result is missing 'postcode'"))?;
        self.client.revalidate(canonical)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
