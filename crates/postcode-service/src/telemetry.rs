// crates/postcode-service/src/telemetry.rs
// ============================================================================
// Module: Service Telemetry
// Description: Observability hooks for parse and validate calls.
// Purpose: Report per-call and per-batch events without a global logger.
// Dependencies: postcode-core, serde, tracing
// ============================================================================

//! ## Overview
//! The service reports one [`ParseEvent`] per candidate and one
//! [`BatchEvent`] per batch call to an injected [`ServiceObserver`].
//! Events carry codes and counts only, never the candidate text, so sinks
//! can label metrics with them safely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use postcode_core::ErrorCode;
use serde::Serialize;

// ============================================================================
// SECTION: Event Labels
// ============================================================================

/// Public operation that produced an event.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `parse_one` or `parse_many`.
    Parse,
    /// `validate_one` or `validate_many`.
    Validate,
}

impl Operation {
    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Validate => "validate",
        }
    }
}

/// Single-candidate event payload.
///
/// # Invariants
/// - `error_code` is `None` exactly when `valid` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseEvent {
    /// Operation that handled the candidate.
    pub operation: Operation,
    /// Whether the candidate resolved to a postcode.
    pub valid: bool,
    /// Failure code for invalid candidates.
    pub error_code: Option<ErrorCode>,
    /// Wall time spent on the candidate.
    pub latency: Duration,
}

/// Batch event payload.
///
/// # Invariants
/// - `valid <= size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEvent {
    /// Operation that handled the batch.
    pub operation: Operation,
    /// Number of candidates in the batch.
    pub size: usize,
    /// Number of candidates that resolved.
    pub valid: usize,
    /// Wall time spent on the batch.
    pub latency: Duration,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Event sink for service calls.
pub trait ServiceObserver: Send + Sync {
    /// Records a single-candidate event.
    fn record_parse(&self, event: &ParseEvent);
    /// Records a batch summary.
    fn record_batch(&self, event: &BatchEvent);
}

/// No-op event sink.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ServiceObserver for NoopObserver {
    fn record_parse(&self, _event: &ParseEvent) {}

    fn record_batch(&self, _event: &BatchEvent) {}
}

/// Event sink that emits `tracing` events.
///
/// Parse events are `debug`; batch summaries are `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ServiceObserver for TracingObserver {
    fn record_parse(&self, event: &ParseEvent) {
        tracing::debug!(
            operation = event.operation.as_str(),
            valid = event.valid,
            error_code = event.error_code.map(ErrorCode::as_str),
            latency_us = duration_micros(event.latency),
            "postcode processed"
        );
    }

    fn record_batch(&self, event: &BatchEvent) {
        tracing::info!(
            operation = event.operation.as_str(),
            size = event.size,
            valid = event.valid,
            latency_us = duration_micros(event.latency),
            "postcode batch processed"
        );
    }
}

/// Converts a duration to whole microseconds, saturating at `u64::MAX`.
fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
