// crates/postcode-handlers/src/http.rs
// ============================================================================
// Module: HTTP Lookup Plumbing
// Description: Shared blocking HTTP client for remote postcode lookups.
// Purpose: Issue bounded GET requests and map transport failures to errors.
// Dependencies: postcode-core, reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`LookupClient`] wraps a blocking `reqwest` client with a whole-request
//! timeout, redirects disabled, and a hard response size limit. Transport
//! failures map to structured errors:
//! - timeouts to [`PostcodeError::HandlerTimeout`];
//! - connection failures to [`PostcodeError::HandlerConnection`];
//! - oversized or undecodable bodies to [`PostcodeError::Internal`].
//!
//! Status-code policy belongs to each handler; this module only transports.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::io::Read;
use std::time::Duration;

use postcode_core::Postcode;
use postcode_core::PostcodeError;
use postcode_core::PostcodeHandler;
use postcode_core::normalize;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde_json::Value;

use crate::regex::RegexHandler;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default whole-request timeout for remote lookups.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
/// Maximum accepted response body size, in bytes.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// User agent sent with every lookup.
const USER_AGENT: &str = concat!("postcode/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Lookup Client
// ============================================================================

/// Blocking HTTP client shared by the remote handlers.
///
/// # Invariants
/// - `timeout` covers connect, headers, and body.
/// - Redirects are never followed.
#[derive(Debug, Clone)]
pub struct LookupClient {
    /// Handler label used in errors and log events.
    label: &'static str,
    /// Whole-request timeout.
    timeout: Duration,
    /// Underlying HTTP client.
    client: Client,
    /// Local handler used to re-validate canonical strings.
    regex: RegexHandler,
}

impl LookupClient {
    /// Builds a client for the labelled handler.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] when the HTTP client cannot be
    /// built or the grammar fails to compile.
    pub fn new(label: &'static str, timeout: Duration) -> Result<Self, PostcodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|err| PostcodeError::internal(format!("{label} http client build failed: {err}")))?;
        Ok(Self {
            label,
            timeout,
            client,
            regex: RegexHandler::new()?,
        })
    }

    /// Returns the handler label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the whole-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a GET request, mapping transport failures.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::HandlerTimeout`] or
    /// [`PostcodeError::HandlerConnection`] when the request cannot complete.
    pub fn get(&self, url: Url) -> Result<Response, PostcodeError> {
        self.client.get(url).send().map_err(|err| self.map_send_error(&err))
    }

    /// Reads and decodes a JSON response body within [`MAX_RESPONSE_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::HandlerTimeout`] if the body stalls past the
    /// timeout and [`PostcodeError::Internal`] for oversized, truncated, or
    /// undecodable bodies.
    pub fn read_json(&self, response: &mut Response) -> Result<Value, PostcodeError> {
        let body = read_response_limited(response, MAX_RESPONSE_BYTES).map_err(|err| match err {
            ReadError::TimedOut => PostcodeError::timeout(self.label, self.timeout),
            ReadError::Invalid(reason) => {
                PostcodeError::internal(format!("{} response {reason}", self.label))
            }
        })?;
        serde_json::from_slice(&body).map_err(|err| {
            PostcodeError::internal(format!("{} response is not valid JSON: {err}", self.label))
        })
    }

    /// Normalizes a canonical string from the provider and matches it locally.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::NotFound`] when the canonical string does not
    /// match the grammar.
    pub fn revalidate(&self, canonical: &str) -> Result<Postcode, PostcodeError> {
        self.regex.resolve(&normalize(canonical))
    }

    /// Maps a send failure to a structured error.
    fn map_send_error(&self, err: &reqwest::Error) -> PostcodeError {
        if err.is_timeout() {
            tracing::warn!(
                handler = self.label,
                timeout_secs = self.timeout.as_secs_f64(),
                "lookup timed out"
            );
            return PostcodeError::timeout(self.label, self.timeout);
        }
        if err.is_connect() || err.is_request() {
            tracing::warn!(handler = self.label, error = %err, "lookup connection failed");
            return PostcodeError::connection(self.label);
        }
        tracing::error!(handler = self.label, error = %err, "lookup failed unexpectedly");
        PostcodeError::internal(format!("{} request failed: {err}", self.label))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses an endpoint URL, accepting only `http` and `https`.
///
/// # Errors
///
/// Returns [`PostcodeError::Internal`] for unparsable URLs or other schemes.
pub fn parse_endpoint(label: &str, endpoint: &str) -> Result<Url, PostcodeError> {
    let url = Url::parse(endpoint)
        .map_err(|err| PostcodeError::internal(format!("{label} endpoint is invalid: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PostcodeError::internal(format!("{label} endpoint scheme '{other}' is not supported"))),
    }
}

/// Returns true for JSON values that count as an empty result.
#[must_use]
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(true) | Value::Number(_)) => false,
    }
}

/// Reasons a bounded body read fails.
enum ReadError {
    /// The body stalled past the client timeout.
    TimedOut,
    /// The body was oversized, truncated, or unreadable.
    Invalid(&'static str),
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, ReadError> {
    let expected_len = response.content_length();
    let max_bytes_u64 =
        u64::try_from(max_bytes).map_err(|_| ReadError::Invalid("size limit exceeds u64"))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(ReadError::Invalid("exceeds size limit"));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| match err.kind() {
        ErrorKind::TimedOut => ReadError::TimedOut,
        _ => ReadError::Invalid("could not be read"),
    })?;
    if buf.len() > max_bytes {
        return Err(ReadError::Invalid("exceeds size limit"));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected).map_err(|_| ReadError::Invalid("has an invalid length"))?;
        if buf.len() < expected {
            return Err(ReadError::Invalid("was truncated"));
        }
    }
    Ok(buf)
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
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use postcode_core::ErrorCode;
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoints_must_be_http_urls() {
        assert!(parse_endpoint("Postcodes.io", "https://api.postcodes.io/postcodes").is_ok());
        assert!(parse_endpoint("Postcodes.io", "http://127.0.0.1:8080/").is_ok());
        let error = parse_endpoint("Postcodes.io", "ftp://example.com").unwrap_err();
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert!(parse_endpoint("Postcodes.io", "not a url").is_err());
    }

    #[test]
    fn blank_values_count_as_empty_results() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!([]))));
        assert!(is_blank(Some(&json!({}))));
        assert!(is_blank(Some(&json!(""))));
        assert!(!is_blank(Some(&json!({"postcode": "SW1A 1AA"}))));
        assert!(!is_blank(Some(&json!([{}]))));
    }

    #[test]
    fn revalidate_normalizes_canonical_strings() {
        let client = LookupClient::new("Postcodes.io", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.revalidate(" sw1a 1aa ").unwrap().full(), "SW1A 1AA");
        assert_eq!(client.label(), "Postcodes.io");
        assert_eq!(client.timeout(), Duration::from_millis(500));
    }
}
