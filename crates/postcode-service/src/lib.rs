// crates/postcode-service/src/lib.rs
// ============================================================================
// Module: Postcode Service
// Description: Public façade for validating and parsing UK postcodes.
// Purpose: Orchestrate validation, normalization, and handler resolution.
// Dependencies: postcode-core, postcode-handlers, serde, tracing
// ============================================================================

//! ## Overview
//! [`Service`] is the entry point for callers. Each call runs
//! validate → normalize → resolve and wraps the result in an
//! [`postcode_core::Outcome`]. Batch calls preserve input order and never stop
//! at the first failure. Unexpected failures, including panics inside a
//! handler, surface as `INTERNAL_ERROR` outcomes.
//!
//! Observability is injected through [`ServiceObserver`]; the default
//! [`NoopObserver`] discards events and [`TracingObserver`] forwards them to
//! `tracing`.
//!
//! ```no_run
//! use postcode_service::Service;
//!
//! # fn main() -> Result<(), postcode_core::PostcodeError> {
//! let service = Service::using_regex()?;
//! let outcome = service.parse_one("sw1a 1aa");
//! assert_eq!(outcome.value().and_then(|postcode| postcode.area()), Some("SW"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod service;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use service::Service;
pub use telemetry::BatchEvent;
pub use telemetry::NoopObserver;
pub use telemetry::Operation;
pub use telemetry::ParseEvent;
pub use telemetry::ServiceObserver;
pub use telemetry::TracingObserver;
