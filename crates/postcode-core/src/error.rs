// crates/postcode-core/src/error.rs
// ============================================================================
// Module: Postcode Errors
// Description: Structured failure taxonomy shared by every resolution path.
// Purpose: Give callers stable machine-readable codes with per-kind context.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every failure in the workspace is a [`PostcodeError`]. Each variant carries
//! the payload its kind needs (offending postcode, handler label, HTTP status,
//! timeout) and maps to one stable [`ErrorCode`]. Errors serialize as a
//! [`FailureReport`] of `code`, `message`, and optional `context`.
//!
//! Invariants:
//! - Error codes and their string forms are stable for programmatic handling.
//! - Errors are constructed at the failure site and never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

use crate::validation::MAX_POSTCODE_LENGTH;
use crate::validation::MIN_POSTCODE_LENGTH;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// Stable error codes exposed to callers.
///
/// # Invariants
/// - String forms never change once released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The candidate was not textual.
    PostcodeTypeError,
    /// The candidate was blank or contained disallowed characters.
    PostcodeFormatError,
    /// The trimmed candidate was outside the accepted length bounds.
    PostcodeLengthError,
    /// No grammar alternative matched.
    PostcodeNotFoundError,
    /// A remote handler exceeded its timeout.
    HandlerTimeoutError,
    /// No handler is registered for the requested type.
    HandlerNotFoundError,
    /// A remote handler could not connect.
    HandlerConnectionError,
    /// A remote handler returned a non-success HTTP status.
    HandlerApiError,
    /// A remote handler returned an empty result set.
    HandlerNoResultsError,
    /// An unexpected failure was caught at the service boundary.
    InternalError,
}

impl ErrorCode {
    /// Returns the stable string form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostcodeTypeError => "POSTCODE_TYPE_ERROR",
            Self::PostcodeFormatError => "POSTCODE_FORMAT_ERROR",
            Self::PostcodeLengthError => "POSTCODE_LENGTH_ERROR",
            Self::PostcodeNotFoundError => "POSTCODE_NOT_FOUND_ERROR",
            Self::HandlerTimeoutError => "HANDLER_TIMEOUT_ERROR",
            Self::HandlerNotFoundError => "HANDLER_NOT_FOUND_ERROR",
            Self::HandlerConnectionError => "HANDLER_CONNECTION_ERROR",
            Self::HandlerApiError => "HANDLER_API_ERROR",
            Self::HandlerNoResultsError => "HANDLER_NO_RESULTS_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Returns the broad category the code belongs to.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::PostcodeTypeError | Self::PostcodeFormatError | Self::PostcodeLengthError => {
                ErrorCategory::Input
            }
            Self::PostcodeNotFoundError
            | Self::HandlerTimeoutError
            | Self::HandlerConnectionError
            | Self::HandlerApiError
            | Self::HandlerNoResultsError => ErrorCategory::Resolution,
            Self::HandlerNotFoundError => ErrorCategory::Configuration,
            Self::InternalError => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad failure categories.
///
/// # Invariants
/// - Input and resolution failures are recoverable per call.
/// - Configuration failures surface when a handler is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input-shape failures: type, emptiness, length, character set.
    Input,
    /// Resolution failures: grammar exhaustion or remote lookup failures.
    Resolution,
    /// Handler selection failures.
    Configuration,
    /// Unanticipated failures.
    Internal,
}

// ============================================================================
// SECTION: Error Type
// ============================================================================

/// Structured postcode failure.
///
/// # Invariants
/// - Each variant maps to exactly one [`ErrorCode`].
/// - `Display` renders as `[CODE] [subject] message`, built from
///   [`PostcodeError::message`]; [`PostcodeError::Internal`] has no subject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostcodeError {
    /// The candidate was not textual.
    Type {
        /// Rendering of the rejected candidate.
        postcode: String,
    },
    /// The candidate was blank or contained disallowed characters.
    Format {
        /// Candidate as supplied.
        postcode: String,
        /// Description of the format violation.
        message: String,
    },
    /// The trimmed candidate was outside the accepted length bounds.
    Length {
        /// Candidate as supplied.
        postcode: String,
        /// Minimum accepted length.
        min: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// No grammar alternative matched.
    NotFound {
        /// Postcode text that failed to match.
        postcode: String,
    },
    /// A remote handler exceeded its timeout.
    HandlerTimeout {
        /// Handler label.
        handler: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// No handler is registered for the requested type.
    HandlerNotFound {
        /// Requested handler type.
        handler: String,
    },
    /// A remote handler could not connect.
    HandlerConnection {
        /// Handler label.
        handler: String,
    },
    /// A remote handler returned a non-success HTTP status.
    HandlerApi {
        /// Handler label.
        handler: String,
        /// HTTP status code.
        status: u16,
        /// Provider-specific or generic status message.
        message: String,
    },
    /// A remote handler returned an empty result set.
    HandlerNoResults {
        /// Handler label.
        handler: String,
        /// Query text sent to the provider.
        query: String,
    },
    /// An unexpected failure was caught.
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl PostcodeError {
    /// Creates a type error for a non-textual candidate.
    #[must_use]
    pub fn type_error(postcode: impl Into<String>) -> Self {
        Self::Type {
            postcode: postcode.into(),
        }
    }

    /// Creates a format error for a blank candidate.
    #[must_use]
    pub fn empty(postcode: impl Into<String>) -> Self {
        let postcode = postcode.into();
        let message = format!("Postcode '{postcode}' cannot be empty or whitespace.");
        Self::Format {
            postcode,
            message,
        }
    }

    /// Creates a format error for a candidate with disallowed characters.
    #[must_use]
    pub fn invalid_characters(postcode: impl Into<String>) -> Self {
        let postcode = postcode.into();
        let message = format!(
            "Postcode '{postcode}' contains invalid characters. Only A-Z, 0-9, space, and hyphen \
             are allowed."
        );
        Self::Format {
            postcode,
            message,
        }
    }

    /// Creates a length error using the validator bounds.
    #[must_use]
    pub fn length(postcode: impl Into<String>) -> Self {
        Self::Length {
            postcode: postcode.into(),
            min: MIN_POSTCODE_LENGTH,
            max: MAX_POSTCODE_LENGTH,
        }
    }

    /// Creates a not-found error for an unmatched postcode.
    #[must_use]
    pub fn not_found(postcode: impl Into<String>) -> Self {
        Self::NotFound {
            postcode: postcode.into(),
        }
    }

    /// Creates a handler-not-found error.
    #[must_use]
    pub fn handler_not_found(handler: impl Into<String>) -> Self {
        Self::HandlerNotFound {
            handler: handler.into(),
        }
    }

    /// Creates a timeout error for a remote handler.
    #[must_use]
    pub fn timeout(handler: impl Into<String>, timeout: Duration) -> Self {
        Self::HandlerTimeout {
            handler: handler.into(),
            timeout,
        }
    }

    /// Creates a connection error for a remote handler.
    #[must_use]
    pub fn connection(handler: impl Into<String>) -> Self {
        Self::HandlerConnection {
            handler: handler.into(),
        }
    }

    /// Creates an empty-result error for a remote handler.
    #[must_use]
    pub fn no_results(handler: impl Into<String>, query: impl Into<String>) -> Self {
        Self::HandlerNoResults {
            handler: handler.into(),
            query: query.into(),
        }
    }

    /// Creates an API error, falling back to a generic status message.
    #[must_use]
    pub fn api(handler: impl Into<String>, status: u16, message: Option<String>) -> Self {
        let handler = handler.into();
        let message = message
            .unwrap_or_else(|| format!("{handler} returned unexpected status code {status}."));
        Self::HandlerApi {
            handler,
            status,
            message,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Type {
                ..
            } => ErrorCode::PostcodeTypeError,
            Self::Format {
                ..
            } => ErrorCode::PostcodeFormatError,
            Self::Length {
                ..
            } => ErrorCode::PostcodeLengthError,
            Self::NotFound {
                ..
            } => ErrorCode::PostcodeNotFoundError,
            Self::HandlerTimeout {
                ..
            } => ErrorCode::HandlerTimeoutError,
            Self::HandlerNotFound {
                ..
            } => ErrorCode::HandlerNotFoundError,
            Self::HandlerConnection {
                ..
            } => ErrorCode::HandlerConnectionError,
            Self::HandlerApi {
                ..
            } => ErrorCode::HandlerApiError,
            Self::HandlerNoResults {
                ..
            } => ErrorCode::HandlerNoResultsError,
            Self::Internal {
                ..
            } => ErrorCode::InternalError,
        }
    }

    /// Returns the postcode or handler label the failure is about.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Type {
                postcode,
            }
            | Self::Format {
                postcode, ..
            }
            | Self::Length {
                postcode, ..
            }
            | Self::NotFound {
                postcode,
            } => Some(postcode.as_str()),
            Self::HandlerTimeout {
                handler, ..
            }
            | Self::HandlerNotFound {
                handler,
            }
            | Self::HandlerConnection {
                handler,
            }
            | Self::HandlerApi {
                handler, ..
            }
            | Self::HandlerNoResults {
                handler, ..
            } => Some(handler.as_str()),
            Self::Internal {
                ..
            } => None,
        }
    }

    /// Returns the human-readable message without the code prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Type {
                postcode,
            } => format!("Postcode '{postcode}' must be a string."),
            Self::Format {
                message, ..
            }
            | Self::HandlerApi {
                message, ..
            }
            | Self::Internal {
                message,
            } => message.clone(),
            Self::Length {
                postcode,
                min,
                max,
            } => format!("Postcode '{postcode}' must be between {min} and {max} characters long."),
            Self::NotFound {
                postcode,
            } => format!("Postcode '{postcode}' not found."),
            Self::HandlerTimeout {
                handler,
                timeout,
            } => format!("{handler} timed out after {} seconds.", timeout.as_secs_f64()),
            Self::HandlerNotFound {
                handler,
            } => format!("No handler registered for type '{handler}'."),
            Self::HandlerConnection {
                handler,
            } => format!(
                "{handler} failed to connect. Please check your network or API endpoint."
            ),
            Self::HandlerNoResults {
                handler,
                query,
            } => format!("{handler} returned no results for query '{query}'."),
        }
    }

    /// Returns the structured context attached to the failure.
    #[must_use]
    pub fn context(&self) -> ErrorContext {
        match self {
            Self::Type {
                postcode,
            }
            | Self::Format {
                postcode, ..
            }
            | Self::Length {
                postcode, ..
            }
            | Self::NotFound {
                postcode,
            } => ErrorContext {
                postcode: Some(postcode.clone()),
                ..ErrorContext::default()
            },
            Self::HandlerTimeout {
                handler,
                timeout,
            } => ErrorContext {
                handler: Some(handler.clone()),
                timeout_ms: Some(duration_millis(*timeout)),
                ..ErrorContext::default()
            },
            Self::HandlerNotFound {
                handler,
            }
            | Self::HandlerConnection {
                handler,
            } => ErrorContext {
                handler: Some(handler.clone()),
                ..ErrorContext::default()
            },
            Self::HandlerApi {
                handler,
                status,
                ..
            } => ErrorContext {
                handler: Some(handler.clone()),
                status: Some(*status),
                ..ErrorContext::default()
            },
            Self::HandlerNoResults {
                handler,
                query,
            } => ErrorContext {
                handler: Some(handler.clone()),
                query: Some(query.clone()),
                ..ErrorContext::default()
            },
            Self::Internal {
                ..
            } => ErrorContext::default(),
        }
    }

    /// Returns the serializable report for this failure.
    #[must_use]
    pub fn report(&self) -> FailureReport {
        FailureReport {
            code: self.code(),
            message: self.message(),
            context: self.context(),
        }
    }
}

impl fmt::Display for PostcodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject() {
            Some(subject) => write!(f, "[{}] [{subject}] {}", self.code(), self.message()),
            None => write!(f, "[{}] {}", self.code(), self.message()),
        }
    }
}

impl Serialize for PostcodeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.report().serialize(serializer)
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Optional context attached to a failure.
///
/// # Invariants
/// - Fields are `None` when the failure kind does not carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Handler label that produced the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Offending postcode text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    /// Query text sent to a remote provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// HTTP status returned by a remote provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Timeout in milliseconds that elapsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ErrorContext {
    /// Returns true when no context field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.handler.is_none()
            && self.postcode.is_none()
            && self.query.is_none()
            && self.status.is_none()
            && self.timeout_ms.is_none()
    }
}

/// Serializable failure payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Optional structured context.
    #[serde(default, skip_serializing_if = "ErrorContext::is_empty")]
    pub context: ErrorContext,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
