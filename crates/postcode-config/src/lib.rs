// crates/postcode-config/src/lib.rs
// ============================================================================
// Module: Postcode Config Library
// Description: Configuration model and loader for postcode tooling.
// Purpose: Single source of truth for postcode.toml semantics.
// Dependencies: postcode-core, postcode-handlers, serde, toml, url
// ============================================================================

//! ## Overview
//! `postcode-config` loads `postcode.toml`, validates it fail-closed, and
//! turns the `[handler]` section into [`postcode_handlers::HandlerSettings`].
//! The `[logging]` section is consumed by the CLI when it installs a
//! subscriber.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
