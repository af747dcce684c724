// crates/postcode-handlers/src/regex.rs
// ============================================================================
// Module: Regex Handler
// Description: Local, offline postcode resolution.
// Purpose: Resolve postcodes against the shared UK grammar with no I/O.
// Dependencies: postcode-core
// ============================================================================

//! ## Overview
//! The regex handler is the terminal step of every resolution path. It is the
//! default backend and the re-validation step for remote handlers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use postcode_core::Grammar;
use postcode_core::Postcode;
use postcode_core::PostcodeError;
use postcode_core::PostcodeHandler;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Resolves postcodes by grammar match alone.
///
/// # Invariants
/// - Performs no I/O and holds only a shared reference to the grammar.
#[derive(Debug, Clone, Copy)]
pub struct RegexHandler {
    /// Grammar consulted on every call.
    grammar: &'static Grammar,
}

impl RegexHandler {
    /// Creates a handler over the shared UK grammar.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] if the grammar fails to compile.
    pub fn new() -> Result<Self, PostcodeError> {
        Ok(Self {
            grammar: Grammar::uk()?,
        })
    }
}

impl PostcodeHandler for RegexHandler {
    fn resolve(&self, postcode: &str) -> Result<Postcode, PostcodeError> {
        self.grammar.resolve(postcode)
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
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use postcode_core::ErrorCode;

    use super::*;

    #[test]
    fn resolves_normalized_input() {
        let handler = RegexHandler::new().unwrap();
        let postcode = handler.resolve("SW1A 1AA").unwrap();
        assert_eq!(postcode.area(), Some("SW"));
        assert_eq!(postcode.district(), Some("1A"));
    }

    #[test]
    fn unmatched_input_is_not_found() {
        let handler = RegexHandler::new().unwrap();
        let error = handler.resolve("sw1a 1aa").unwrap_err();
        assert_eq!(error.code(), ErrorCode::PostcodeNotFoundError);
    }
}
