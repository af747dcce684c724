//! Handler selection property-based tests.
//!
//! ## Purpose
//! Handler type identifiers arrive from configuration files and command-line
//! flags. These tests check that selection fails closed for any identifier
//! outside the built-in set.
// crates/postcode-handlers/tests/proptest_registry.rs
// ============================================================================
// Module: Handler Registry Property-Based Tests
// Description: Randomized checks for handler type parsing.
// Purpose: Ensure unknown identifiers always map to HANDLER_NOT_FOUND_ERROR.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use postcode_core::ErrorCode;
use postcode_handlers::HandlerType;
use proptest::prelude::*;

proptest! {
    #[test]
    fn unknown_identifiers_fail_closed(raw in "[a-z_]{0,24}") {
        let known = HandlerType::ALL.iter().any(|handler_type| handler_type.as_str() == raw);
        match raw.parse::<HandlerType>() {
            Ok(handler_type) => prop_assert!(known && handler_type.as_str() == raw),
            Err(error) => {
                prop_assert!(!known);
                prop_assert_eq!(error.code(), ErrorCode::HandlerNotFoundError);
                prop_assert_eq!(error.context().handler, Some(raw.clone()));
            }
        }
    }

    #[test]
    fn identifiers_are_case_sensitive(index in 0usize..3) {
        let upper = HandlerType::ALL[index].as_str().to_ascii_uppercase();
        prop_assert!(upper.parse::<HandlerType>().is_err());
    }
}
