// crates/postcode-cli/src/main.rs
// ============================================================================
// Module: Postcode CLI Entry Point
// Description: Command dispatcher for postcode parsing and validation.
// Purpose: Expose the postcode service and config checks on the command line.
// Dependencies: clap, postcode-config, postcode-core, postcode-service, thiserror
// ============================================================================

//! ## Overview
//! `postcode parse` prints one JSON outcome per input and `postcode validate`
//! prints `<input>\t<true|false>` lines. Inputs come from positional
//! arguments or a JSON array file; array elements that are not strings yield
//! type errors rather than aborting the batch. Handler selection comes from
//! `postcode.toml`, with command-line overrides.
//!
//! Inputs are untrusted: input files are read under a hard size limit.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod logging;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use postcode_config::HandlerConfig;
use postcode_config::PostcodeConfig;
use postcode_core::Candidate;
use postcode_core::Outcome;
use postcode_service::Service;
use postcode_service::TracingObserver;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a `--input` file in bytes.
const MAX_INPUT_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "postcode", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse postcodes into their components and print JSON outcomes.
    Parse(PostcodeCommand),
    /// Report whether each postcode is valid.
    Validate(PostcodeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a postcode configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to `POSTCODE_CONFIG` or `postcode.toml`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Arguments shared by `parse` and `validate`.
#[derive(Args, Debug)]
struct PostcodeCommand {
    /// Postcodes to process.
    #[arg(value_name = "POSTCODE", conflicts_with = "input")]
    postcodes: Vec<String>,
    /// JSON array of inputs to process instead of positional postcodes.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Config file path (defaults to `POSTCODE_CONFIG` or `postcode.toml`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Handler section overrides.
    #[command(flatten)]
    overrides: HandlerOverrides,
    /// Exit non-zero when any input is invalid.
    #[arg(long)]
    strict: bool,
}

/// Command-line overrides for the `[handler]` config section.
#[derive(Args, Debug, Default)]
struct HandlerOverrides {
    /// Handler type: `regex`, `http_postcodes_io`, or `http_osdatahub`.
    #[arg(long, value_name = "TYPE")]
    handler: Option<String>,
    /// OS Data Hub API key.
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
    /// Remote request timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

impl HandlerOverrides {
    /// Applies the overrides to a handler section.
    ///
    /// Switching handler type starts from a fresh section so keys and
    /// endpoints for the previous handler do not leak across.
    fn apply(&self, handler: &mut HandlerConfig) {
        if let Some(handler_type) = &self.handler
            && handler_type.trim() != handler.handler_type.trim()
        {
            *handler = HandlerConfig {
                handler_type: handler_type.clone(),
                timeout_ms: handler.timeout_ms,
                ..HandlerConfig::default()
            };
        }
        if let Some(api_key) = &self.api_key {
            handler.api_key = Some(api_key.clone());
            handler.api_key_env = None;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            handler.timeout_ms = timeout_ms;
        }
    }
}

/// Postcode operation selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Print JSON outcomes.
    Parse,
    /// Print validity flags.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Parse(command) => command_postcodes(Mode::Parse, &command),
        Commands::Validate(command) => command_postcodes(Mode::Validate, &command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

// ============================================================================
// SECTION: Postcode Commands
// ============================================================================

/// Executes `parse` or `validate`.
fn command_postcodes(mode: Mode, command: &PostcodeCommand) -> CliResult<ExitCode> {
    let (mut config, source) = PostcodeConfig::load_with_source(command.config.as_deref())
        .map_err(|err| CliError::new(format!("Failed to load config: {err}")))?;
    command.overrides.apply(&mut config.handler);
    let settings = config
        .handler
        .handler_settings()
        .map_err(|err| CliError::new(format!("Failed to load config: {err}")))?;
    logging::init_logging(&config.logging)
        .map_err(|err| CliError::new(format!("Failed to initialize logging: {err}")))?;
    tracing::debug!(
        source = %source,
        handler = settings.handler_type().as_str(),
        "config loaded"
    );

    let inputs = collect_inputs(command)?;
    let service = Service::create(&settings)
        .map_err(|err| CliError::new(format!("Failed to create service: {err}")))?
        .with_observer(Arc::new(TracingObserver));
    tracing::info!(
        handler = settings.handler_type().as_str(),
        inputs = inputs.len(),
        "processing postcodes"
    );

    let all_valid = match mode {
        Mode::Parse => {
            let outcomes = service.parse_many(&inputs);
            for outcome in &outcomes {
                write_line(&render_outcome(outcome)?)?;
            }
            outcomes.iter().all(Outcome::is_valid)
        }
        Mode::Validate => {
            let flags = service.validate_many(&inputs);
            for (input, valid) in inputs.iter().zip(&flags) {
                write_line(&render_validity(input, *valid))?;
            }
            flags.iter().all(|valid| *valid)
        }
    };
    if command.strict && !all_valid {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Gathers inputs from positional arguments or the `--input` file.
fn collect_inputs(command: &PostcodeCommand) -> CliResult<Vec<Value>> {
    let inputs = match &command.input {
        Some(path) => read_input_file(path)?,
        None => command.postcodes.iter().cloned().map(Value::String).collect(),
    };
    if inputs.is_empty() {
        return Err(CliError::new(
            "No postcodes supplied; pass them as arguments or with --input.".to_string(),
        ));
    }
    Ok(inputs)
}

/// Reads a JSON array of inputs from disk.
fn read_input_file(path: &Path) -> CliResult<Vec<Value>> {
    let bytes = read_bytes_with_limit(path, MAX_INPUT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(format!(
            "Failed to read input file {}: {err}",
            path.display()
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "Refusing to read input file at {} because it is {size} bytes (limit {limit}).",
            path.display()
        )),
    })?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(format!("Failed to parse input file {}: {err}", path.display()))
    })?;
    match value {
        Value::Array(values) => Ok(values),
        _ => Err(CliError::new(format!(
            "Input file {} must contain a JSON array.",
            path.display()
        ))),
    }
}

/// Renders an outcome as a single JSON line.
fn render_outcome(outcome: &Outcome) -> CliResult<String> {
    serde_json::to_string(outcome)
        .map_err(|err| CliError::new(format!("Failed to serialize outcome: {err}")))
}

/// Renders an input and its validity as a tab-separated line.
fn render_validity(input: &Value, valid: bool) -> String {
    format!("{}\t{valid}", Candidate::from(input).describe())
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = PostcodeConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("Failed to load config: {err}")))?;
    write_line("Config valid.")?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single stdout line, mapping failures to a [`CliError`].
fn write_line(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("Failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
