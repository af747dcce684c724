// crates/postcode-core/src/grammar.rs
// ============================================================================
// Module: Postcode Grammar
// Description: Ordered, anchored pattern alternatives with named captures.
// Purpose: Segment a normalized postcode into area, district, sector, unit.
// Dependencies: regex, tracing
// ============================================================================

//! ## Overview
//! A [`GrammarRule`] is an ordered list of compiled, fully anchored patterns
//! sharing a [`PostcodeFormat`]. A [`Grammar`] is an ordered list of rules.
//! Matching tries every alternative strictly in declaration order and the
//! first match wins. Named groups `area`, `district`, `sector`, and `unit`
//! populate the resulting [`Postcode`]; groups an alternative does not declare
//! stay absent.
//!
//! The declaration order is load-bearing. Several alternatives overlap in
//! shape (four-letter territory areas and Eircode routing keys, literal
//! prefixes such as `BFPO` and `GIR` against generic letter runs), and the
//! order below is the disambiguation policy.
//!
//! Standard patterns follow BS7666 as published in the Land Registry Web
//! Services Interface Specification v6.4. Special cases (GIR 0AA, overseas
//! territories, AI-2640, KY1-1001) follow the documented exceptions to the UK
//! postcode scheme.
//!
//! Invariants:
//! - Patterns are matched against uppercase input only.
//! - The UK grammar is compiled once per process and never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;

use crate::error::PostcodeError;
use crate::model::Postcode;
use crate::model::PostcodeFormat;

// ============================================================================
// SECTION: UK Patterns
// ============================================================================

/// UK alternatives in match order.
const UK_PATTERNS: &[&str] = &[
    // BS7666 standard form. The unit alphabet omits C, I, K, M, O, and V.
    r"^(?P<area>(?:BF1|[A-Z]{1,2}))(?P<district>[0-9]{1,2}[A-Z]?) ?(?P<sector>[0-9])(?P<unit>[ABDEFGHJLNPQRSTUWXYZ]{2})$",
    // BFPO 1234
    r"^BFPO ?(?P<unit>[0-9]{1,4})$",
    // Eircode: D02 X285, D6W 1234
    r"^(?P<area>[AC-FHKNPRTV-Y][0-9]{1,2}|D6W) ?(?P<unit>[0-9AC-FHKNPRTV-Y]{4})$",
    // Overseas territories: ASCN 1ZZ
    r"^(?P<area>[A-Z]{4}) ?(?P<sector>[0-9])(?P<unit>[A-Z]{2})$",
    // Anguilla: AI-2640
    r"^(?P<area>AI)-(?P<unit>[0-9]{4})$",
    // Cayman Islands: KY1-1001
    r"^(?P<area>KY[1-3])-(?P<unit>[0-9]{4})$",
    // Montserrat: MSR-1110
    r"^(?P<area>MSR)-(?P<unit>[0-9]{4})$",
    // British Virgin Islands: VG1110
    r"^(?P<area>VG)(?P<unit>[0-9]{4})$",
    // Bermuda: HM 01, HM BX
    r"^(?P<area>[A-Z]{2}) (?P<unit>[0-9]{2}|BX)$",
    // Girobank
    r"^(?P<area>GIR) ?(?P<sector>0)(?P<unit>AA)$",
];

/// Lazily compiled UK grammar shared by every handler.
static UK_GRAMMAR: LazyLock<Result<Grammar, regex::Error>> =
    LazyLock::new(|| Ok(Grammar::new(vec![GrammarRule::new(PostcodeFormat::Uk, UK_PATTERNS)?])));

// ============================================================================
// SECTION: Grammar Rule
// ============================================================================

/// Ordered pattern alternatives for one postcode format.
///
/// # Invariants
/// - Patterns are tried in declaration order.
/// - Each pattern anchors both ends of the input.
#[derive(Debug, Clone)]
pub struct GrammarRule {
    /// Format tag assigned to every match.
    format: PostcodeFormat,
    /// Compiled alternatives in match order.
    patterns: Vec<Regex>,
}

impl GrammarRule {
    /// Compiles a rule from pattern sources.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] when a pattern fails to compile.
    pub fn new(format: PostcodeFormat, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns.iter().map(|source| Regex::new(source)).collect::<Result<_, _>>()?;
        Ok(Self {
            format,
            patterns,
        })
    }

    /// Returns the format tag of the rule.
    #[must_use]
    pub const fn format(&self) -> PostcodeFormat {
        self.format
    }

    /// Returns the number of alternatives in the rule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true when the rule has no alternatives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Matches the value against each alternative, returning the first hit.
    #[must_use]
    pub fn match_postcode(&self, value: &str) -> Option<Postcode> {
        tracing::trace!(value, format = %self.format, "matching postcode against rule");
        self.patterns.iter().find_map(|regex| {
            let captures = regex.captures(value)?;
            tracing::debug!(value, pattern = regex.as_str(), "postcode matched");
            Some(self.build(&captures))
        })
    }

    /// Builds a postcode from the named groups of a match.
    fn build(&self, captures: &Captures<'_>) -> Postcode {
        let group = |name: &str| captures.name(name).map(|found| found.as_str().to_string());
        Postcode::from_parts(
            self.format,
            group("area"),
            group("district"),
            group("sector"),
            group("unit"),
        )
    }
}

// ============================================================================
// SECTION: Grammar
// ============================================================================

/// Ordered set of grammar rules.
///
/// # Invariants
/// - Rules are tried in declaration order; the first match wins.
/// - Immutable after construction and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// Rules in match order.
    rules: Vec<GrammarRule>,
}

impl Grammar {
    /// Creates a grammar from rules in match order.
    #[must_use]
    pub const fn new(rules: Vec<GrammarRule>) -> Self {
        Self {
            rules,
        }
    }

    /// Returns the shared UK grammar, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Internal`] if the built-in patterns fail to
    /// compile.
    pub fn uk() -> Result<&'static Self, PostcodeError> {
        UK_GRAMMAR
            .as_ref()
            .map_err(|err| PostcodeError::internal(format!("postcode grammar failed to compile: {err}")))
    }

    /// Returns the rules in match order.
    #[must_use]
    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    /// Resolves a normalized postcode into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::NotFound`] when no alternative matches.
    pub fn resolve(&self, normalized: &str) -> Result<Postcode, PostcodeError> {
        self.rules
            .iter()
            .find_map(|rule| rule.match_postcode(normalized))
            .ok_or_else(|| {
                tracing::debug!(postcode = normalized, "no grammar alternative matched");
                PostcodeError::not_found(normalized)
            })
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
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;
    use crate::error::ErrorCode;

    fn resolve(value: &str) -> Postcode {
        Grammar::uk().unwrap().resolve(value).unwrap_or_else(|err| panic!("{value}: {err}"))
    }

    fn fields(postcode: &Postcode) -> [Option<&str>; 4] {
        [postcode.area(), postcode.district(), postcode.sector(), postcode.unit()]
    }

    #[test]
    fn uk_grammar_declares_ten_alternatives() {
        let grammar = Grammar::uk().unwrap();
        assert_eq!(grammar.rules().len(), 1);
        assert_eq!(grammar.rules()[0].format(), PostcodeFormat::Uk);
        assert_eq!(grammar.rules()[0].len(), 10);
    }

    #[test]
    fn standard_form_splits_all_parts() {
        let postcode = resolve("SW1A 1AA");
        assert_eq!(fields(&postcode), [Some("SW"), Some("1A"), Some("1"), Some("AA")]);
        let postcode = resolve("SW1A1AA");
        assert_eq!(postcode.full(), "SW1A 1AA");
    }

    #[test]
    fn bf1_prefix_backtracks_to_letter_area() {
        let postcode = resolve("BF1 0AA");
        assert_eq!(fields(&postcode), [Some("BF"), Some("1"), Some("0"), Some("AA")]);
    }

    #[test]
    fn bfpo_populates_unit_only() {
        let postcode = resolve("BFPO 123");
        assert_eq!(fields(&postcode), [None, None, None, Some("123")]);
        assert_eq!(postcode.outcode(), "");
        assert_eq!(postcode.full(), " 123");
        assert_eq!(resolve("BFPO1").unit(), Some("1"));
    }

    #[test]
    fn eircode_routing_keys() {
        let postcode = resolve("A65 F4E2");
        assert_eq!(fields(&postcode), [Some("A65"), None, None, Some("F4E2")]);
        let postcode = resolve("D6W 1234");
        assert_eq!(fields(&postcode), [Some("D6W"), None, None, Some("1234")]);
    }

    #[test]
    fn territory_forms() {
        assert_eq!(fields(&resolve("ASCN 1ZZ")), [Some("ASCN"), None, Some("1"), Some("ZZ")]);
        assert_eq!(fields(&resolve("AI-2640")), [Some("AI"), None, None, Some("2640")]);
        assert_eq!(fields(&resolve("KY1-1102")), [Some("KY1"), None, None, Some("1102")]);
        assert_eq!(fields(&resolve("MSR-1110")), [Some("MSR"), None, None, Some("1110")]);
        assert_eq!(fields(&resolve("VG1110")), [Some("VG"), None, None, Some("1110")]);
        assert_eq!(fields(&resolve("HM 11")), [Some("HM"), None, None, Some("11")]);
        assert_eq!(fields(&resolve("HM BX")), [Some("HM"), None, None, Some("BX")]);
    }

    #[test]
    fn gibraltar_uses_standard_form() {
        assert_eq!(fields(&resolve("GX11 1AA")), [Some("GX"), Some("11"), Some("1"), Some("AA")]);
    }

    #[test]
    fn girobank_special_case() {
        let postcode = resolve("GIR 0AA");
        assert_eq!(fields(&postcode), [Some("GIR"), None, Some("0"), Some("AA")]);
        assert_eq!(postcode.full(), "GIR 0AA");
    }

    #[test]
    fn matching_is_case_sensitive_and_anchored() {
        let grammar = Grammar::uk().unwrap();
        for value in ["sw1a 1aa", "XSW1A 1AA", "SW1A 1AAX", "SW1A 1AC", "A1 1AAAA", "E1W-1AA", "KY4-1001"] {
            let error = grammar.resolve(value).unwrap_err();
            assert_eq!(error.code(), ErrorCode::PostcodeNotFoundError, "{value}");
        }
    }

    #[test]
    fn not_found_carries_postcode_text() {
        let error = Grammar::uk().unwrap().resolve("A65 B2CD").unwrap_err();
        assert_eq!(error.context().postcode.as_deref(), Some("A65 B2CD"));
    }

    #[test]
    fn custom_rules_respect_declaration_order() {
        let rule = GrammarRule::new(
            PostcodeFormat::Uk,
            &[r"^(?P<area>[A-Z]+)$", r"^(?P<unit>[A-Z]+)$"],
        )
        .unwrap();
        let grammar = Grammar::new(vec![rule]);
        let postcode = grammar.resolve("ABCD").unwrap();
        assert_eq!(postcode.area(), Some("ABCD"));
        assert_eq!(postcode.unit(), None);
    }

    #[test]
    fn invalid_pattern_fails_to_compile() {
        assert!(GrammarRule::new(PostcodeFormat::Uk, &["(unclosed"]).is_err());
        assert!(GrammarRule::new(PostcodeFormat::Uk, &[]).unwrap().is_empty());
    }
}
