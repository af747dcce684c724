// crates/postcode-core/src/outcome.rs
// ============================================================================
// Module: Parse Outcome
// Description: Success-or-failure record returned by every parse call.
// Purpose: Let batch callers keep per-item results without early exit.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Outcome`] holds exactly one of a [`Postcode`] or a [`PostcodeError`].
//! It serializes as `{"value": {...}}` or `{"error": {...}}`, so a batch of
//! outcomes keeps its order and shape on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::error::PostcodeError;
use crate::model::Postcode;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of parsing a single candidate.
///
/// # Invariants
/// - Exactly one of value or error is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The candidate resolved to a postcode.
    Value(Postcode),
    /// The candidate failed validation or resolution.
    Error(PostcodeError),
}

impl Outcome {
    /// Returns true when the outcome holds a postcode.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns the postcode, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Postcode> {
        match self {
            Self::Value(postcode) => Some(postcode),
            Self::Error(_) => None,
        }
    }

    /// Returns the error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&PostcodeError> {
        match self {
            Self::Value(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Converts the outcome into a standard result.
    ///
    /// # Errors
    ///
    /// Returns the held [`PostcodeError`] when the outcome is a failure.
    pub fn into_result(self) -> Result<Postcode, PostcodeError> {
        match self {
            Self::Value(postcode) => Ok(postcode),
            Self::Error(error) => Err(error),
        }
    }
}

impl From<Result<Postcode, PostcodeError>> for Outcome {
    fn from(result: Result<Postcode, PostcodeError>) -> Self {
        match result {
            Ok(postcode) => Self::Value(postcode),
            Err(error) => Self::Error(error),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
