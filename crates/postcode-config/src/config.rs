// crates/postcode-config/src/config.rs
// ============================================================================
// Module: Postcode Configuration
// Description: Configuration loading and validation for postcode tooling.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: postcode-core, postcode-handlers, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown fields, unknown handler types, and out-of-range values fail closed.
//! API keys may be given inline or by environment variable name; the key
//! itself is never logged or printed by `Debug`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use postcode_core::PostcodeError;
use postcode_handlers::HandlerSettings;
use postcode_handlers::HandlerType;
use postcode_handlers::OsDataHubSettings;
use postcode_handlers::PostcodesIoSettings;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "postcode.toml";
/// Environment variable overriding the config path.
pub const CONFIG_ENV_VAR: &str = "POSTCODE_CONFIG";
/// Maximum config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a whole path.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum remote handler timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 50;
/// Maximum remote handler timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 30_000;
/// Default remote handler timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 500;
/// Maximum API key length.
pub(crate) const MAX_API_KEY_LENGTH: usize = 256;
/// Maximum environment variable name length.
pub(crate) const MAX_ENV_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for postcode tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostcodeConfig {
    /// Resolution backend selection.
    #[serde(default)]
    pub handler: HandlerConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PostcodeConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// An explicit path wins, then [`CONFIG_ENV_VAR`], then `postcode.toml`
    /// in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        Self::load_resolved(&resolved)
    }

    /// Loads configuration, falling back to defaults when nothing was
    /// requested and the default file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicit or env-selected file fails to
    /// load, or when the default file exists but is invalid.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_source(path).map(|(config, _)| config)
    }

    /// Same as [`PostcodeConfig::load_or_default`], also reporting where the
    /// configuration came from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] under the same conditions as
    /// [`PostcodeConfig::load_or_default`].
    pub fn load_with_source(path: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        if path.is_none() && env::var_os(CONFIG_ENV_VAR).is_none() {
            let default_path = Path::new(DEFAULT_CONFIG_NAME);
            if !default_path.exists() {
                return Ok((Self::default(), ConfigSource::Defaults));
            }
            let config = Self::load_resolved(default_path)?;
            return Ok((config, ConfigSource::File(default_path.to_path_buf())));
        }
        let resolved = resolve_path(path)?;
        let config = Self::load_resolved(&resolved)?;
        Ok((config, ConfigSource::File(resolved)))
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown fields,
    /// and other [`ConfigError`] variants when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.handler.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Reads a resolved path under the size and encoding limits.
    fn load_resolved(resolved: &Path) -> Result<Self, ConfigError> {
        validate_path(resolved)?;
        let bytes = fs::read(resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file.
    File(PathBuf),
    /// No file was requested or found; built-in defaults apply.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("defaults"),
        }
    }
}

// ============================================================================
// SECTION: Handler Config
// ============================================================================

/// `[handler]` section.
///
/// # Invariants
/// - At most one of `api_key` and `api_key_env` is set.
/// - `Debug` output redacts `api_key`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    /// Handler type identifier, e.g. `regex` or `http_postcodes_io`.
    #[serde(rename = "type", default = "default_handler_type")]
    pub handler_type: String,
    /// Remote request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Inline API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Endpoint override for remote handlers.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            handler_type: default_handler_type(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_key: None,
            api_key_env: None,
            endpoint: None,
        }
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("handler_type", &self.handler_type)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl HandlerConfig {
    /// Parses the configured handler type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Handler`] wrapping
    /// [`PostcodeError::HandlerNotFound`] for unknown identifiers.
    pub fn parsed_type(&self) -> Result<HandlerType, ConfigError> {
        Ok(self.handler_type.trim().parse::<HandlerType>()?)
    }

    /// Returns the remote request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the handler section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the handler section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let handler_type = self.parsed_type()?;
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "handler.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        match (&self.api_key, &self.api_key_env) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "handler.api_key and handler.api_key_env are mutually exclusive".to_string(),
                ));
            }
            (Some(key), None) => validate_api_key(key)?,
            (None, Some(name)) => validate_env_name(name)?,
            (None, None) => {}
        }
        let has_key = self.api_key.is_some() || self.api_key_env.is_some();
        if handler_type == HandlerType::OsDataHub && !has_key {
            return Err(ConfigError::Invalid(
                "handler.api_key or handler.api_key_env is required for http_osdatahub"
                    .to_string(),
            ));
        }
        if handler_type != HandlerType::OsDataHub && has_key {
            return Err(ConfigError::Invalid(format!(
                "handler.api_key is not used by the {handler_type} handler"
            )));
        }
        if let Some(endpoint) = &self.endpoint {
            if !handler_type.is_remote() {
                return Err(ConfigError::Invalid(format!(
                    "handler.endpoint is not used by the {handler_type} handler"
                )));
            }
            validate_endpoint(endpoint)?;
        }
        Ok(())
    }

    /// Builds handler settings, resolving the API key from the environment
    /// when configured by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails or the named API key
    /// variable is unset.
    pub fn handler_settings(&self) -> Result<HandlerSettings, ConfigError> {
        self.validate()?;
        let settings = match self.parsed_type()? {
            HandlerType::Regex => HandlerSettings::Regex,
            HandlerType::PostcodesIo => {
                let mut settings = PostcodesIoSettings::with_timeout(self.timeout());
                if let Some(endpoint) = &self.endpoint {
                    settings.endpoint = endpoint.trim().to_string();
                }
                HandlerSettings::PostcodesIo(settings)
            }
            HandlerType::OsDataHub => {
                let mut settings = OsDataHubSettings::new(self.resolve_api_key()?, self.timeout());
                if let Some(endpoint) = &self.endpoint {
                    settings.endpoint = endpoint.trim().to_string();
                }
                HandlerSettings::OsDataHub(settings)
            }
        };
        Ok(settings)
    }

    /// Returns the inline key or the value of the named variable.
    fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = &self.api_key {
            return Ok(key.trim().to_string());
        }
        let Some(name) = &self.api_key_env else {
            return Err(ConfigError::Invalid("handler api key is not configured".to_string()));
        };
        let value = env::var(name.trim()).map_err(|_| {
            ConfigError::Invalid(format!("handler.api_key_env variable '{}' is not set", name.trim()))
        })?;
        validate_api_key(&value)?;
        Ok(value.trim().to_string())
    }
}

/// Returns the default handler identifier.
fn default_handler_type() -> String {
    HandlerType::Regex.as_str().to_string()
}

/// Returns the default remote timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

// ============================================================================
// SECTION: Logging Config
// ============================================================================

/// Minimum severity written to log outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Everything, including per-rule matching.
    Trace,
    /// Outbound requests and per-candidate events.
    Debug,
    /// Batch summaries.
    Info,
    /// Remote failures.
    #[default]
    Warn,
    /// Internal failures only.
    Error,
}

impl LogLevel {
    /// Returns the stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Returns the matching `tracing` level.
    #[must_use]
    pub const fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum severity.
    #[serde(default)]
    pub level: LogLevel,
    /// Write to stderr.
    #[serde(default = "default_console")]
    pub console: bool,
    /// Optional log file; parent directories are created on demand.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            console: default_console(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Returns the log file path, if configured.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.as_deref().map(|file| PathBuf::from(file.trim()))
    }

    /// Validates the logging section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the file path is empty or
    /// exceeds path limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(file) = &self.file {
            validate_path_string("logging.file", file)?;
        }
        Ok(())
    }
}

/// Console output defaults to on.
const fn default_console() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Unknown handler type.
    #[error("config handler error: {0}")]
    Handler(#[from] PostcodeError),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an inline API key.
fn validate_api_key(key: &str) -> Result<(), ConfigError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("handler.api_key must be non-empty".to_string()));
    }
    if trimmed.len() > MAX_API_KEY_LENGTH {
        return Err(ConfigError::Invalid("handler.api_key exceeds max length".to_string()));
    }
    Ok(())
}

/// Validates an environment variable name.
fn validate_env_name(name: &str) -> Result<(), ConfigError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("handler.api_key_env must be non-empty".to_string()));
    }
    if trimmed.len() > MAX_ENV_NAME_LENGTH {
        return Err(ConfigError::Invalid("handler.api_key_env exceeds max length".to_string()));
    }
    if !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(ConfigError::Invalid(
            "handler.api_key_env must contain only ASCII letters, digits, and underscores"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validates a remote endpoint URL.
fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let trimmed = endpoint.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| ConfigError::Invalid(format!("handler.endpoint is not a valid url: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::Invalid(
            "handler.endpoint must include http:// or https://".to_string(),
        )),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn validate_path_string_accepts_valid_path() {
        assert!(validate_path_string("logging.file", "logs/postcode.log").is_ok());
    }

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let error = validate_path_string("logging.file", "   ").unwrap_err();
        assert!(error.to_string().contains("logging.file must be non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_component_too_long() {
        let value = format!("logs/{}", "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1));
        let error = validate_path_string("logging.file", &value).unwrap_err();
        assert!(error.to_string().contains("path component too long"));
    }

    #[test]
    fn validate_path_string_accepts_component_at_max() {
        let value = "a".repeat(MAX_PATH_COMPONENT_LENGTH);
        assert!(validate_path_string("logging.file", &value).is_ok());
    }

    #[test]
    fn env_names_are_restricted() {
        assert!(validate_env_name("OS_API_KEY").is_ok());
        assert!(validate_env_name("OS-API-KEY").is_err());
        assert!(validate_env_name("").is_err());
    }

    #[test]
    fn endpoints_require_http_schemes() {
        assert!(validate_endpoint("https://api.postcodes.io/postcodes").is_ok());
        assert!(validate_endpoint("http://127.0.0.1:8080/find").is_ok());
        assert!(validate_endpoint("ftp://example.com").is_err());
        assert!(validate_endpoint("not a url").is_err());
    }

    #[test]
    fn log_levels_map_to_tracing_levels() {
        assert_eq!(LogLevel::default(), LogLevel::Warn);
        assert_eq!(LogLevel::Debug.as_tracing(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn debug_output_redacts_inline_key() {
        let config = HandlerConfig {
            handler_type: "http_osdatahub".to_string(),
            api_key: Some("secret".to_string()),
            ..HandlerConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
