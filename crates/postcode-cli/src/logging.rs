// crates/postcode-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Installs the tracing subscriber from the `[logging]` section.
// Purpose: Route library events to stderr and an optional log file.
// Dependencies: postcode-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! Libraries only emit `tracing` events; the CLI decides where they go. The
//! configured level filters every output. Console output goes to stderr so
//! stdout stays machine-readable; file output is appended without ANSI
//! escapes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use postcode_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging setup failures.
#[derive(Debug, Error)]
pub(crate) enum LoggingError {
    /// The log file or its parent directory could not be opened.
    #[error("cannot open log file {path}: {source}")]
    File {
        /// Log file path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A global subscriber was already installed.
    #[error("cannot install subscriber: {0}")]
    Install(String),
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Installs the global subscriber described by the logging section.
///
/// # Errors
///
/// Returns [`LoggingError`] when the log file cannot be opened or a global
/// subscriber is already installed.
pub(crate) fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::new(config.level.as_str());
    let console = config.console.then(|| fmt::layer().with_writer(io::stderr).with_target(false));
    let file = match config.file_path() {
        Some(path) => Some(
            fmt::layer().with_ansi(false).with_writer(Mutex::new(open_log_file(&path)?)),
        ),
        None => None,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}

/// Opens a log file for appending, creating parent directories.
pub(crate) fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let to_error = |source: io::Error| LoggingError::File {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    OpenOptions::new().create(true).append(true).open(path).map_err(to_error)
}
