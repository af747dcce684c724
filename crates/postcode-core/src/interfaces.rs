// crates/postcode-core/src/interfaces.rs
// ============================================================================
// Module: Postcode Interfaces
// Description: Backend-agnostic resolution contract.
// Purpose: Define the surface every postcode handler implements.
// Dependencies: crate::error, crate::model
// ============================================================================

//! ## Overview
//! A handler turns a validated, normalized postcode into a [`Postcode`]
//! record. Local handlers match the grammar directly; remote handlers ask an
//! upstream service for a canonical string and then match that string against
//! the same grammar.
//!
//! Security posture: remote handlers consume untrusted network responses and
//! must map every failure to a [`PostcodeError`] rather than panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::PostcodeError;
use crate::model::Postcode;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Resolves normalized postcodes into structured records.
///
/// # Invariants
/// - Input has already passed validation and normalization.
/// - Implementations hold no per-call mutable state and are safe to share.
pub trait PostcodeHandler: Send + Sync {
    /// Resolves a normalized postcode.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError`] when the postcode is unknown or the backend
    /// fails.
    fn resolve(&self, postcode: &str) -> Result<Postcode, PostcodeError>;
}

impl<T: PostcodeHandler + ?Sized> PostcodeHandler for Box<T> {
    fn resolve(&self, postcode: &str) -> Result<Postcode, PostcodeError> {
        (**self).resolve(postcode)
    }
}

impl<T: PostcodeHandler + ?Sized> PostcodeHandler for std::sync::Arc<T> {
    fn resolve(&self, postcode: &str) -> Result<Postcode, PostcodeError> {
        (**self).resolve(postcode)
    }
}
