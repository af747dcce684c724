// crates/postcode-core/src/model.rs
// ============================================================================
// Module: Postcode Model
// Description: Structured postcode record and its derived views.
// Purpose: Carry decomposed postcode fields with explicit absence semantics.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Postcode`] is the decomposition of a matched string into up to four
//! named parts. Parts the matching alternative does not define are `None`,
//! never the empty string. The outward code, inward code, and full form are
//! computed on demand and treat absent parts as empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeStruct;

// ============================================================================
// SECTION: Format Tag
// ============================================================================

/// Postcode format families recognized by the grammar.
///
/// # Invariants
/// - Variants are stable for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PostcodeFormat {
    /// United Kingdom postcodes, including Crown dependencies, BFPO, BOT, and
    /// adjacent Eircode shapes.
    #[serde(rename = "UK")]
    Uk,
}

impl PostcodeFormat {
    /// Returns the stable label for the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uk => "UK",
        }
    }
}

impl fmt::Display for PostcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Postcode
// ============================================================================

/// A postcode decomposed into area, district, sector, and unit.
///
/// # Invariants
/// - Constructed only by a grammar match; there are no setters.
/// - At least one part is present.
/// - Absent parts are `None`, never `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Postcode {
    /// Format family of the matching grammar.
    format: PostcodeFormat,
    /// Area, e.g. `SW`.
    area: Option<String>,
    /// District within the outward code, e.g. `1A`.
    district: Option<String>,
    /// Sector within the inward code, e.g. `1`.
    sector: Option<String>,
    /// Unit, e.g. `AA`.
    unit: Option<String>,
}

impl Postcode {
    /// Builds a record from captured parts. Only the grammar calls this.
    pub(crate) const fn from_parts(
        format: PostcodeFormat,
        area: Option<String>,
        district: Option<String>,
        sector: Option<String>,
        unit: Option<String>,
    ) -> Self {
        Self {
            format,
            area,
            district,
            sector,
            unit,
        }
    }

    /// Returns the format family.
    #[must_use]
    pub const fn format(&self) -> PostcodeFormat {
        self.format
    }

    /// Returns the area, if the matching alternative defines one.
    #[must_use]
    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    /// Returns the district, if the matching alternative defines one.
    #[must_use]
    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    /// Returns the sector, if the matching alternative defines one.
    #[must_use]
    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    /// Returns the unit, if the matching alternative defines one.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Returns the outward code (area followed by district).
    #[must_use]
    pub fn outcode(&self) -> String {
        join_parts(self.area(), self.district())
    }

    /// Returns the inward code (sector followed by unit).
    #[must_use]
    pub fn incode(&self) -> String {
        join_parts(self.sector(), self.unit())
    }

    /// Returns the outward and inward codes separated by a single space.
    ///
    /// The space is always present, so a BFPO record renders as `" 123"`.
    #[must_use]
    pub fn full(&self) -> String {
        format!("{} {}", self.outcode(), self.incode())
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.outcode(), self.incode())
    }
}

impl Serialize for Postcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Postcode", 8)?;
        state.serialize_field("format", &self.format)?;
        state.serialize_field("area", &self.area)?;
        state.serialize_field("district", &self.district)?;
        state.serialize_field("sector", &self.sector)?;
        state.serialize_field("unit", &self.unit)?;
        state.serialize_field("outcode", &self.outcode())?;
        state.serialize_field("incode", &self.incode())?;
        state.serialize_field("full", &self.full())?;
        state.end()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Concatenates two optional parts, treating absence as empty.
fn join_parts(first: Option<&str>, second: Option<&str>) -> String {
    let mut joined = String::with_capacity(8);
    joined.push_str(first.unwrap_or_default());
    joined.push_str(second.unwrap_or_default());
    joined
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
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    fn parts(area: Option<&str>, district: Option<&str>, sector: Option<&str>, unit: Option<&str>) -> Postcode {
        Postcode::from_parts(
            PostcodeFormat::Uk,
            area.map(str::to_string),
            district.map(str::to_string),
            sector.map(str::to_string),
            unit.map(str::to_string),
        )
    }

    #[test]
    fn derived_views_join_present_parts() {
        let postcode = parts(Some("SW"), Some("1A"), Some("1"), Some("AA"));
        assert_eq!(postcode.outcode(), "SW1A");
        assert_eq!(postcode.incode(), "1AA");
        assert_eq!(postcode.full(), "SW1A 1AA");
        assert_eq!(postcode.to_string(), "SW1A 1AA");
    }

    #[test]
    fn derived_views_treat_absent_parts_as_empty() {
        let postcode = parts(None, None, None, Some("123"));
        assert_eq!(postcode.outcode(), "");
        assert_eq!(postcode.incode(), "123");
        assert_eq!(postcode.full(), " 123");
    }

    #[test]
    fn serialization_includes_derived_views_and_nulls() {
        let postcode = parts(Some("GIR"), None, Some("0"), Some("AA"));
        let value = serde_json::to_value(&postcode).unwrap();
        assert_eq!(value["format"], "UK");
        assert_eq!(value["area"], "GIR");
        assert!(value["district"].is_null());
        assert_eq!(value["outcode"], "GIR");
        assert_eq!(value["full"], "GIR 0AA");
    }
}
