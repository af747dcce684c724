// crates/postcode-core/src/normalize.rs
// ============================================================================
// Module: Postcode Normalization
// Description: Whitespace trimming and locale-invariant uppercasing.
// Purpose: Produce the canonical text form the grammar matches against.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Normalization trims every Unicode whitespace class from both ends and then
//! uppercases ASCII letters only. Characters outside ASCII pass through
//! unchanged, so the result never depends on locale case tables.

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Strips leading and trailing whitespace.
#[must_use]
pub fn strip_postcode(postcode: &str) -> &str {
    postcode.trim()
}

/// Uppercases ASCII letters, leaving every other character untouched.
#[must_use]
pub fn uppercase_postcode(postcode: &str) -> String {
    postcode.to_ascii_uppercase()
}

/// Trims and uppercases a raw postcode.
///
/// Total and idempotent: `normalize(&normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(postcode: &str) -> String {
    uppercase_postcode(strip_postcode(postcode))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
