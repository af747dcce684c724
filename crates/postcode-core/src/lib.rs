// crates/postcode-core/src/lib.rs
// ============================================================================
// Module: Postcode Core
// Description: Normalization, validation, and grammar-based decomposition.
// Purpose: Provide the shared postcode model and resolution contract.
// Dependencies: regex, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! `postcode-core` owns everything that does not touch the network: the
//! [`Postcode`] record, the structured [`PostcodeError`] taxonomy, the input
//! [`normalize`] and [`validate_postcode`] steps, and the ordered UK
//! [`Grammar`] that segments a normalized string into area, district, sector,
//! and unit.
//!
//! Resolution backends implement [`PostcodeHandler`]. Every backend, local or
//! remote, ends in [`Grammar::resolve`] so the field shape of a [`Postcode`]
//! never depends on which backend produced it.
//!
//! Invariants:
//! - The grammar is compiled once per process and shared read-only.
//! - A [`Postcode`] is only ever produced by a grammar match.
//! - An [`Outcome`] holds exactly one of a postcode or an error.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod grammar;
pub mod interfaces;
pub mod model;
pub mod normalize;
pub mod outcome;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ErrorCategory;
pub use error::ErrorCode;
pub use error::ErrorContext;
pub use error::FailureReport;
pub use error::PostcodeError;
pub use grammar::Grammar;
pub use grammar::GrammarRule;
pub use interfaces::PostcodeHandler;
pub use model::Postcode;
pub use model::PostcodeFormat;
pub use normalize::normalize;
pub use outcome::Outcome;
pub use validation::Candidate;
pub use validation::MAX_POSTCODE_LENGTH;
pub use validation::MIN_POSTCODE_LENGTH;
pub use validation::validate_postcode;
