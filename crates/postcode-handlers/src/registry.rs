// crates/postcode-handlers/src/registry.rs
// ============================================================================
// Module: Handler Registry
// Description: Maps handler settings to constructed handlers.
// Purpose: Select a resolution backend and fail closed on unknown types.
// Dependencies: postcode-core
// ============================================================================

//! ## Overview
//! [`HandlerSettings`] is a closed set of per-backend configuration shapes,
//! each tagged with a [`HandlerType`]. [`HandlerRegistry`] maps handler types
//! to constructor functions; [`HandlerRegistry::create`] looks up the
//! settings' type and fails with [`PostcodeError::HandlerNotFound`] when
//! nothing is registered for it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use postcode_core::PostcodeError;
use postcode_core::PostcodeHandler;
use serde::Deserialize;
use serde::Serialize;

use crate::OsDataHubHandler;
use crate::OsDataHubSettings;
use crate::PostcodesIoHandler;
use crate::PostcodesIoSettings;
use crate::RegexHandler;

// ============================================================================
// SECTION: Handler Type
// ============================================================================

/// Identifier of a resolution backend.
///
/// # Invariants
/// - String forms are stable for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandlerType {
    /// Local grammar match.
    #[serde(rename = "regex")]
    Regex,
    /// Postcodes.io lookup.
    #[serde(rename = "http_postcodes_io")]
    PostcodesIo,
    /// OS Data Hub Names lookup.
    #[serde(rename = "http_osdatahub")]
    OsDataHub,
}

impl HandlerType {
    /// All built-in handler types.
    pub const ALL: [Self; 3] = [Self::Regex, Self::PostcodesIo, Self::OsDataHub];

    /// Returns the stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::PostcodesIo => "http_postcodes_io",
            Self::OsDataHub => "http_osdatahub",
        }
    }

    /// Returns true for backends that perform network I/O.
    #[must_use]
    pub const fn is_remote(self) -> bool {
        matches!(self, Self::PostcodesIo | Self::OsDataHub)
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerType {
    type Err = PostcodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|handler_type| handler_type.as_str() == value)
            .ok_or_else(|| PostcodeError::handler_not_found(value))
    }
}

// ============================================================================
// SECTION: Handler Settings
// ============================================================================

/// Configuration for one resolution backend.
///
/// # Invariants
/// - Immutable once built; each variant maps to exactly one [`HandlerType`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HandlerSettings {
    /// Local grammar match; no fields.
    #[default]
    Regex,
    /// Postcodes.io lookup.
    PostcodesIo(PostcodesIoSettings),
    /// OS Data Hub lookup.
    OsDataHub(OsDataHubSettings),
}

impl HandlerSettings {
    /// Returns the handler type these settings configure.
    #[must_use]
    pub const fn handler_type(&self) -> HandlerType {
        match self {
            Self::Regex => HandlerType::Regex,
            Self::PostcodesIo(_) => HandlerType::PostcodesIo,
            Self::OsDataHub(_) => HandlerType::OsDataHub,
        }
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Builds a handler from settings.
pub type HandlerConstructor = fn(&HandlerSettings) -> Result<Box<dyn PostcodeHandler>, PostcodeError>;

/// Handler constructor registry.
///
/// # Invariants
/// - At most one constructor per handler type.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    /// Constructors keyed by handler type.
    constructors: BTreeMap<HandlerType, HandlerConstructor>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in handler.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(HandlerType::Regex, build_regex);
        registry.register(HandlerType::PostcodesIo, build_postcodes_io);
        registry.register(HandlerType::OsDataHub, build_osdatahub);
        registry
    }

    /// Registers a constructor, replacing any previous one for the type.
    pub fn register(&mut self, handler_type: HandlerType, constructor: HandlerConstructor) {
        self.constructors.insert(handler_type, constructor);
    }

    /// Returns true when a constructor is registered for the type.
    #[must_use]
    pub fn contains(&self, handler_type: HandlerType) -> bool {
        self.constructors.contains_key(&handler_type)
    }

    /// Constructs the handler described by the settings.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::HandlerNotFound`] when no constructor is
    /// registered for the settings' type, or the constructor's own error.
    pub fn create(&self, settings: &HandlerSettings) -> Result<Box<dyn PostcodeHandler>, PostcodeError> {
        let handler_type = settings.handler_type();
        let Some(constructor) = self.constructors.get(&handler_type) else {
            tracing::error!(handler = handler_type.as_str(), "no handler registered");
            return Err(PostcodeError::handler_not_found(handler_type.as_str()));
        };
        tracing::debug!(handler = handler_type.as_str(), "constructing handler");
        constructor(settings)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

// ============================================================================
// SECTION: Built-in Constructors
// ============================================================================

/// Builds a [`RegexHandler`].
fn build_regex(settings: &HandlerSettings) -> Result<Box<dyn PostcodeHandler>, PostcodeError> {
    match settings {
        HandlerSettings::Regex => Ok(Box::new(RegexHandler::new()?)),
        other => Err(mismatch(HandlerType::Regex, other)),
    }
}

/// Builds a [`PostcodesIoHandler`].
fn build_postcodes_io(settings: &HandlerSettings) -> Result<Box<dyn PostcodeHandler>, PostcodeError> {
    match settings {
        HandlerSettings::PostcodesIo(settings) => Ok(Box::new(PostcodesIoHandler::new(settings)?)),
        other => Err(mismatch(HandlerType::PostcodesIo, other)),
    }
}

/// Builds an [`OsDataHubHandler`].
fn build_osdatahub(settings: &HandlerSettings) -> Result<Box<dyn PostcodeHandler>, PostcodeError> {
    match settings {
        HandlerSettings::OsDataHub(settings) => Ok(Box::new(OsDataHubHandler::new(settings)?)),
        other => Err(mismatch(HandlerType::OsDataHub, other)),
    }
}

/// Reports settings registered under the wrong handler type.
fn mismatch(expected: HandlerType, settings: &HandlerSettings) -> PostcodeError {
    PostcodeError::internal(format!(
        "{expected} constructor received {} settings",
        settings.handler_type()
    ))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
