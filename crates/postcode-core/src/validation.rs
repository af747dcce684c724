// crates/postcode-core/src/validation.rs
// ============================================================================
// Module: Postcode Validation
// Description: Structural pre-checks applied before grammar matching.
// Purpose: Reject malformed candidates with the first failing check's error.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Validation runs four checks in a fixed order and stops at the first
//! failure:
//! 1. type: the candidate must be textual ([`PostcodeError::Type`]);
//! 2. emptiness: the trimmed candidate must not be empty
//!    ([`PostcodeError::Format`]);
//! 3. length: the trimmed candidate must have between
//!    [`MIN_POSTCODE_LENGTH`] and [`MAX_POSTCODE_LENGTH`] characters
//!    ([`PostcodeError::Length`]);
//! 4. character set: every character of the untrimmed candidate must be an
//!    ASCII letter, digit, space, or hyphen ([`PostcodeError::Format`]).
//!
//! Candidates arrive either as Rust strings or as untyped JSON values, which
//! is where non-textual input comes from in practice.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::error::PostcodeError;
use crate::normalize::strip_postcode;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Minimum accepted length of a trimmed candidate, in characters.
pub const MIN_POSTCODE_LENGTH: usize = 4;
/// Maximum accepted length of a trimmed candidate, in characters.
pub const MAX_POSTCODE_LENGTH: usize = 9;

// ============================================================================
// SECTION: Candidate
// ============================================================================

/// Raw input offered for validation.
///
/// # Invariants
/// - Only [`Candidate::Text`] and JSON strings are textual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Candidate<'a> {
    /// Text supplied directly.
    Text(&'a str),
    /// Untyped JSON value, e.g. an element of a batch request.
    Json(&'a Value),
}

impl<'a> Candidate<'a> {
    /// Returns the text when the candidate is textual.
    #[must_use]
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Self::Text(text) => Some(text),
            Self::Json(value) => value.as_str(),
        }
    }

    /// Renders the candidate for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => (*text).to_string(),
            Self::Json(Value::String(text)) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl<'a> From<&'a str> for Candidate<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for Candidate<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl<'a> From<&'a Value> for Candidate<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Json(value)
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Returns the candidate text, or a type error when it is not textual.
///
/// # Errors
///
/// Returns [`PostcodeError::Type`] for non-textual candidates.
pub fn validate_postcode_type<'a>(candidate: &Candidate<'a>) -> Result<&'a str, PostcodeError> {
    candidate.as_text().ok_or_else(|| PostcodeError::type_error(candidate.describe()))
}

/// Rejects candidates that are empty after trimming.
///
/// # Errors
///
/// Returns [`PostcodeError::Format`] for blank candidates.
pub fn validate_postcode_not_empty(postcode: &str) -> Result<(), PostcodeError> {
    if strip_postcode(postcode).is_empty() {
        return Err(PostcodeError::empty(postcode));
    }
    Ok(())
}

/// Rejects candidates whose trimmed length is out of bounds.
///
/// # Errors
///
/// Returns [`PostcodeError::Length`] when the trimmed character count is
/// outside [`MIN_POSTCODE_LENGTH`]..=[`MAX_POSTCODE_LENGTH`].
pub fn validate_postcode_length(postcode: &str) -> Result<(), PostcodeError> {
    let length = strip_postcode(postcode).chars().count();
    if !(MIN_POSTCODE_LENGTH..=MAX_POSTCODE_LENGTH).contains(&length) {
        return Err(PostcodeError::length(postcode));
    }
    Ok(())
}

/// Rejects candidates containing characters other than letters, digits,
/// spaces, and hyphens.
///
/// Surrounding whitespace is not exempt: a leading tab fails here even though
/// the emptiness and length checks ignore it.
///
/// # Errors
///
/// Returns [`PostcodeError::Format`] when a disallowed character is present.
pub fn validate_postcode_chars(postcode: &str) -> Result<(), PostcodeError> {
    let allowed = postcode.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == ' ' || ch == '-');
    if !allowed {
        return Err(PostcodeError::invalid_characters(postcode));
    }
    Ok(())
}

/// Runs all checks in order and returns the validated text.
///
/// # Errors
///
/// Returns the [`PostcodeError`] of the first failing check.
pub fn validate_postcode<'a>(candidate: impl Into<Candidate<'a>>) -> Result<&'a str, PostcodeError> {
    let postcode = validate_postcode_type(&candidate.into())?;
    validate_postcode_not_empty(postcode)?;
    validate_postcode_length(postcode)?;
    validate_postcode_chars(postcode)?;
    Ok(postcode)
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

    use serde_json::json;

    use super::*;
    use crate::error::ErrorCode;

    fn code_of(result: Result<&str, PostcodeError>) -> ErrorCode {
        result.expect_err("expected validation failure").code()
    }

    #[test]
    fn type_check_accepts_text_and_json_strings() {
        assert_eq!(validate_postcode_type(&Candidate::from("SW1A 1AA")).unwrap(), "SW1A 1AA");
        let value = json!("AB12-3CD");
        assert_eq!(validate_postcode_type(&Candidate::from(&value)).unwrap(), "AB12-3CD");
    }

    #[test]
    fn type_check_rejects_non_strings() {
        for value in [json!(123), json!(null), json!(["SW1A 1AA"]), json!({"postcode": "EC1A 1BB"})] {
            let error = validate_postcode_type(&Candidate::from(&value)).unwrap_err();
            assert_eq!(error.code(), ErrorCode::PostcodeTypeError);
        }
        let error = validate_postcode_type(&Candidate::from(&json!(123))).unwrap_err();
        assert_eq!(error.message(), "Postcode '123' must be a string.");
    }

    #[test]
    fn blank_candidates_are_format_errors() {
        for value in ["", "   ", "\n", "\t"] {
            let error = validate_postcode_not_empty(value).unwrap_err();
            assert_eq!(error.code(), ErrorCode::PostcodeFormatError);
        }
        assert!(validate_postcode_not_empty("W1A-0AX").is_ok());
    }

    #[test]
    fn length_bounds_apply_to_trimmed_text() {
        for value in ["A1", "Z9", "ABCDEFGHIJK", "AB12 3CD XYZ"] {
            let error = validate_postcode_length(value).unwrap_err();
            assert_eq!(error.code(), ErrorCode::PostcodeLengthError);
        }
        for value in ["SW1A 1AA", "AB1 2CD", "EC1A-1BB", "  L1 8JQ  ", "ABCD", "ABCDEFGHI"] {
            assert!(validate_postcode_length(value).is_ok(), "{value} should pass");
        }
    }

    #[test]
    fn character_set_rejects_symbols() {
        for value in ["SW1A/1AA", "EC1A_1BB", "ABC@123", "SW1A\t1AA", "SW1Á 1AA"] {
            let error = validate_postcode_chars(value).unwrap_err();
            assert_eq!(error.code(), ErrorCode::PostcodeFormatError);
        }
        for value in ["SW1A 1AA", "W1A-0AX", "ec1a-1bb"] {
            assert!(validate_postcode_chars(value).is_ok(), "{value} should pass");
        }
    }

    #[test]
    fn character_set_covers_surrounding_whitespace() {
        for value in ["\tSW1A 1AA", "SW1A 1AA\t", " SW1A 1AA\t", "\u{3000}SW1A 1AA", "SW1A 1AA\r\n"] {
            assert_eq!(code_of(validate_postcode(value)), ErrorCode::PostcodeFormatError, "{value:?}");
        }
        assert!(validate_postcode("  SW1A 1AA  ").is_ok());
    }

    #[test]
    fn checks_run_in_fixed_order() {
        assert_eq!(code_of(validate_postcode(&json!(123))), ErrorCode::PostcodeTypeError);
        assert_eq!(code_of(validate_postcode("")), ErrorCode::PostcodeFormatError);
        assert_eq!(code_of(validate_postcode("   ")), ErrorCode::PostcodeFormatError);
        assert_eq!(code_of(validate_postcode("A1")), ErrorCode::PostcodeLengthError);
        // Length is checked before the character set.
        assert_eq!(code_of(validate_postcode("@@")), ErrorCode::PostcodeLengthError);
        assert_eq!(code_of(validate_postcode("SW1A@1AA")), ErrorCode::PostcodeFormatError);
    }

    #[test]
    fn valid_candidates_return_original_text() {
        assert_eq!(validate_postcode(" sw1a 1aa ").unwrap(), " sw1a 1aa ");
        let owned = String::from("GIR 0AA");
        assert_eq!(validate_postcode(&owned).unwrap(), "GIR 0AA");
    }
}
