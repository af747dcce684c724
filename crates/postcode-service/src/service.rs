// crates/postcode-service/src/service.rs
// ============================================================================
// Module: Service Façade
// Description: Single and batch postcode parsing over a pluggable handler.
// Purpose: Turn every input into exactly one outcome, never an early exit.
// Dependencies: postcode-core, postcode-handlers, tracing
// ============================================================================

//! ## Overview
//! For each candidate the service:
//! 1. validates it, wrapping the first failing check immediately;
//! 2. normalizes the validated text;
//! 3. resolves it through the configured handler;
//! 4. wraps the postcode or error in an [`Outcome`].
//!
//! Public methods never panic and never return `Err`. A handler panic is
//! caught and reported as `INTERNAL_ERROR`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use postcode_core::Candidate;
use postcode_core::Outcome;
use postcode_core::Postcode;
use postcode_core::PostcodeError;
use postcode_core::PostcodeHandler;
use postcode_core::normalize;
use postcode_core::validate_postcode;
use postcode_handlers::HandlerRegistry;
use postcode_handlers::HandlerSettings;
use postcode_handlers::OsDataHubSettings;
use postcode_handlers::PostcodesIoSettings;

use crate::telemetry::BatchEvent;
use crate::telemetry::NoopObserver;
use crate::telemetry::Operation;
use crate::telemetry::ParseEvent;
use crate::telemetry::ServiceObserver;

// ============================================================================
// SECTION: Service
// ============================================================================

/// Postcode validation and parsing façade.
///
/// # Invariants
/// - The handler is fixed at construction.
/// - Safe to share across threads; calls hold no mutable state.
pub struct Service {
    /// Resolution backend.
    handler: Box<dyn PostcodeHandler>,
    /// Event sink for every call.
    observer: Arc<dyn ServiceObserver>,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service").finish_non_exhaustive()
    }
}

impl Service {
    /// Creates a service over an existing handler.
    #[must_use]
    pub fn new(handler: Box<dyn PostcodeHandler>) -> Self {
        Self {
            handler,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ServiceObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Creates a service from handler settings using the built-in registry.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::HandlerNotFound`] when the settings' handler
    /// type is not registered, or the handler's construction error.
    pub fn create(settings: &HandlerSettings) -> Result<Self, PostcodeError> {
        Self::create_with(&HandlerRegistry::builtin(), settings)
    }

    /// Creates a service from handler settings using a caller registry.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::HandlerNotFound`] when the settings' handler
    /// type is not registered, or the handler's construction error.
    pub fn create_with(
        registry: &HandlerRegistry,
        settings: &HandlerSettings,
    ) -> Result<Self, PostcodeError> {
        Ok(Self::new(registry.create(settings)?))
    }

    /// Creates an offline service backed by the UK grammar.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] if the grammar fails to compile.
    pub fn using_regex() -> Result<Self, PostcodeError> {
        Self::create(&HandlerSettings::Regex)
    }

    /// Creates a service backed by Postcodes.io.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] when the HTTP client cannot be
    /// built.
    pub fn using_postcodes_io(timeout: Duration) -> Result<Self, PostcodeError> {
        Self::create(&HandlerSettings::PostcodesIo(PostcodesIoSettings::with_timeout(timeout)))
    }

    /// Creates a service backed by the OS Data Hub Names API.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] when the HTTP client cannot be
    /// built.
    pub fn using_osdatahub(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PostcodeError> {
        Self::create(&HandlerSettings::OsDataHub(OsDataHubSettings::new(api_key, timeout)))
    }

    /// Validates and parses a single candidate.
    pub fn parse_one<'a>(&self, candidate: impl Into<Candidate<'a>>) -> Outcome {
        self.process(Operation::Parse, candidate.into())
    }

    /// Validates and parses every candidate, preserving input order.
    pub fn parse_many<'a, I>(&self, candidates: I) -> Vec<Outcome>
    where
        I: IntoIterator,
        I::Item: Into<Candidate<'a>>,
    {
        self.process_batch(Operation::Parse, candidates)
    }

    /// Returns true when the candidate resolves to a postcode.
    pub fn validate_one<'a>(&self, candidate: impl Into<Candidate<'a>>) -> bool {
        self.process(Operation::Validate, candidate.into()).is_valid()
    }

    /// Returns the validity of every candidate, preserving input order.
    pub fn validate_many<'a, I>(&self, candidates: I) -> Vec<bool>
    where
        I: IntoIterator,
        I::Item: Into<Candidate<'a>>,
    {
        self.process_batch(Operation::Validate, candidates)
            .iter()
            .map(Outcome::is_valid)
            .collect()
    }

    /// Runs one candidate through the pipeline and records the event.
    fn process(&self, operation: Operation, candidate: Candidate<'_>) -> Outcome {
        let started = Instant::now();
        let outcome = Outcome::from(self.guarded_resolve(candidate));
        self.observer.record_parse(&ParseEvent {
            operation,
            valid: outcome.is_valid(),
            error_code: outcome.error().map(PostcodeError::code),
            latency: started.elapsed(),
        });
        outcome
    }

    /// Runs a batch sequentially and records a summary event.
    fn process_batch<'a, I>(&self, operation: Operation, candidates: I) -> Vec<Outcome>
    where
        I: IntoIterator,
        I::Item: Into<Candidate<'a>>,
    {
        let started = Instant::now();
        let outcomes: Vec<Outcome> = candidates
            .into_iter()
            .map(|candidate| self.process(operation, candidate.into()))
            .collect();
        self.observer.record_batch(&BatchEvent {
            operation,
            size: outcomes.len(),
            valid: outcomes.iter().filter(|outcome| outcome.is_valid()).count(),
            latency: started.elapsed(),
        });
        outcomes
    }

    /// Resolves a candidate, converting handler panics into internal errors.
    fn guarded_resolve(&self, candidate: Candidate<'_>) -> Result<Postcode, PostcodeError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.resolve(candidate))).unwrap_or_else(
            |payload| {
                let error = PostcodeError::internal(format!(
                    "An unexpected error occurred while parsing postcode '{}': {}",
                    candidate.describe(),
                    panic_message(payload.as_ref())
                ));
                tracing::error!(error = %error, "handler panicked");
                Err(error)
            },
        )
    }

    /// Validates, normalizes, and resolves a candidate.
    fn resolve(&self, candidate: Candidate<'_>) -> Result<Postcode, PostcodeError> {
        let postcode = validate_postcode(candidate)?;
        self.handler.resolve(&normalize(postcode))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts a printable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message;
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.as_str();
    }
    "handler panicked"
}

// ============================================================================
// SECTION: Tests
// ============================================================================
