// crates/postcode-handlers/src/lib.rs
// ============================================================================
// Module: Postcode Handlers
// Description: Built-in resolution backends and the handler registry.
// Purpose: Resolve normalized postcodes locally or through remote lookup APIs.
// Dependencies: postcode-core, reqwest, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! This crate ships the built-in [`postcode_core::PostcodeHandler`]
//! implementations and a registry that maps a [`HandlerSettings`] value to a
//! constructed handler:
//! - [`RegexHandler`] matches the shared UK grammar with no I/O.
//! - [`PostcodesIoHandler`] looks the postcode up on Postcodes.io.
//! - [`OsDataHubHandler`] looks the postcode up on the OS Data Hub Names API.
//!
//! Invariants:
//! - Remote handlers never build a [`postcode_core::Postcode`] themselves; the
//!   canonical string they fetch is normalized and matched by [`RegexHandler`].
//! - Remote handlers issue one bounded GET per call, never retry, and read at
//!   most [`http::MAX_RESPONSE_BYTES`] of response body.
//!
//! Security posture: upstream responses are untrusted and every failure maps
//! to a structured [`postcode_core::PostcodeError`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod osdatahub;
pub mod postcodes_io;
pub mod regex;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use osdatahub::OsDataHubHandler;
pub use osdatahub::OsDataHubSettings;
pub use postcodes_io::PostcodesIoHandler;
pub use postcodes_io::PostcodesIoSettings;
pub use regex::RegexHandler;
pub use registry::HandlerConstructor;
pub use registry::HandlerRegistry;
pub use registry::HandlerSettings;
pub use registry::HandlerType;
