//! Identifier shortening for fixed-width displays.
//!
//! Airline ICAO designators are three or four letters, which leaves little
//! room on a six-module display. This module normalizes raw identifiers,
//! swaps them for a shorter code when one is known, and fits the result to
//! the display width.
//!
//! None of these functions fail: unusable input degrades to an empty
//! identifier, which renders as a blank display.

pub mod airlines;

use std::collections::HashMap;

use serde::Serialize;

use crate::models::DisplayText;

pub use airlines::AIRLINE_CODES;

/// Lookup table from canonical identifiers to short display codes.
///
/// Keys are stored uppercase. The only mutation path is [`CodeMapping::upsert`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMapping {
    codes: HashMap<String, String>,
}

impl CodeMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapping preloaded with the built-in airline table.
    #[must_use]
    pub fn airlines() -> Self {
        Self::from_pairs(AIRLINE_CODES.iter().copied())
    }

    /// Builds a mapping from `(identifier, short code)` pairs.
    ///
    /// Pairs go through [`upsert`](Self::upsert), so empty entries are skipped
    /// and later duplicates win.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut mapping = Self::new();
        for (key, value) in pairs {
            mapping.upsert(key, value);
        }
        mapping
    }

    /// Inserts or overwrites a single entry.
    ///
    /// Both key and value are uppercased. Does nothing if either is empty.
    pub fn upsert(&mut self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.codes.insert(key.to_uppercase(), value.to_uppercase());
    }

    /// Returns the short code stored for an already-normalized key.
    #[must_use]
    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.codes.get(normalized).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True if the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Normalizes a raw identifier: trim, uppercase, keep only `A-Z` and `0-9`.
///
/// ```
/// use splitflap_control::formatter::normalize;
///
/// assert_eq!(normalize(" ac-a "), "ACA");
/// ```
#[must_use]
pub fn normalize(identifier: &str) -> String {
    identifier
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Returns the short code for `identifier`, or the normalized identifier if
/// the mapping has no entry. Missing input yields an empty string.
#[must_use]
pub fn lookup(identifier: Option<&str>, mapping: &CodeMapping) -> String {
    let Some(raw) = identifier else {
        return String::new();
    };
    let normalized = normalize(raw);
    match mapping.get(&normalized) {
        Some(short) => short.to_string(),
        None => normalized,
    }
}

/// True if the normalized identifier has an entry in the mapping.
#[must_use]
pub fn has_mapping(identifier: Option<&str>, mapping: &CodeMapping) -> bool {
    identifier.is_some_and(|raw| mapping.get(&normalize(raw)).is_some())
}

/// Formats an identifier as display text of exactly `width` characters.
///
/// Missing or empty input gives `width` spaces.
///
/// ```
/// use splitflap_control::formatter::{format, CodeMapping};
///
/// let mapping = CodeMapping::from_pairs([("AAL", "AA")]);
/// assert_eq!(format(Some("AAL"), &mapping, 6).as_str(), "AA    ");
/// assert_eq!(format(Some("SOMEUNKNOWNCODE"), &mapping, 6).as_str(), "SOMEUN");
/// assert_eq!(format(None, &mapping, 6).as_str(), "      ");
/// ```
#[must_use]
pub fn format(identifier: Option<&str>, mapping: &CodeMapping, width: usize) -> DisplayText {
    DisplayText::fit(&lookup(identifier, mapping), width)
}

/// Everything the formatter knows about one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeLookup {
    /// Identifier as given.
    pub input: String,
    /// Normalized form used as the mapping key.
    pub normalized: String,
    /// Mapped short code, or the normalized identifier.
    pub short_code: String,
    /// Whether the mapping has an entry.
    pub has_mapping: bool,
    /// Final display text.
    pub display: DisplayText,
}

/// Runs every formatter step on `identifier` and reports the intermediate values.
#[must_use]
pub fn describe(identifier: &str, mapping: &CodeMapping, width: usize) -> CodeLookup {
    CodeLookup {
        input: identifier.to_string(),
        normalized: normalize(identifier),
        short_code: lookup(Some(identifier), mapping),
        has_mapping: has_mapping(Some(identifier), mapping),
        display: format(Some(identifier), mapping, width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> CodeMapping {
        CodeMapping::from_pairs([("AAL", "AA"), ("WJA", "WS"), ("CHAL", "CL")])
    }

    #[test]
    fn test_format_mapped_identifier() {
        let mapping = sample_mapping();
        assert_eq!(format(Some("AAL"), &mapping, 6).as_str(), "AA    ");
        assert_eq!(format(Some("chal"), &mapping, 6).as_str(), "CL    ");
    }

    #[test]
    fn test_format_unmapped_identifier_is_truncated() {
        let mapping = CodeMapping::new();
        assert_eq!(
            format(Some("SOMEUNKNOWNCODE"), &mapping, 6).as_str(),
            "SOMEUN"
        );
    }

    #[test]
    fn test_format_invalid_input_is_blank() {
        let mapping = sample_mapping();
        for input in [None, Some(""), Some("   "), Some("-/--")] {
            let text = format(input, &mapping, 6);
            assert_eq!(text.as_str(), "      ", "input {:?}", input);
        }
    }

    #[test]
    fn test_format_length_always_matches_width() {
        let mapping = CodeMapping::airlines();
        let long = "X".repeat(40);
        let inputs = ["", "a", "AAL", "WJA 1234", "ácme", long.as_str()];
        for width in [0, 1, 4, 6, 12] {
            for input in inputs {
                let text = format(Some(input), &mapping, width);
                assert_eq!(text.as_str().chars().count(), width, "{input:?} at {width}");
            }
        }
    }

    #[test]
    fn test_format_strips_punctuation_before_lookup() {
        let mapping = sample_mapping();
        assert_eq!(format(Some(" w.j.a "), &mapping, 6).as_str(), "WS    ");
        assert_eq!(format(Some("AC-123"), &mapping, 6).as_str(), "AC123 ");
    }

    #[test]
    fn test_lookup() {
        let mapping = sample_mapping();
        assert_eq!(lookup(Some("aal"), &mapping), "AA");
        assert_eq!(lookup(Some("xyz9"), &mapping), "XYZ9");
        assert_eq!(lookup(None, &mapping), "");
    }

    #[test]
    fn test_has_mapping() {
        let mapping = sample_mapping();
        assert!(has_mapping(Some(" wja"), &mapping));
        assert!(!has_mapping(Some("XYZ"), &mapping));
        assert!(!has_mapping(None, &mapping));
        assert!(!has_mapping(Some(""), &mapping));
    }

    #[test]
    fn test_upsert_then_lookup_is_case_insensitive() {
        let mut mapping = CodeMapping::new();
        mapping.upsert("flx", "fx");
        assert_eq!(lookup(Some("FLX"), &mapping), "FX");
        assert_eq!(lookup(Some("flx"), &mapping), "FX");

        mapping.upsert("FLX", "F2");
        assert_eq!(lookup(Some("flx"), &mapping), "F2");
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_upsert_ignores_empty_arguments() {
        let mut mapping = CodeMapping::new();
        mapping.upsert("", "AA");
        mapping.upsert("AAL", "");
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_describe_reports_each_step() {
        let report = describe(" wja ", &sample_mapping(), 6);
        assert_eq!(report.normalized, "WJA");
        assert_eq!(report.short_code, "WS");
        assert!(report.has_mapping);
        assert_eq!(report.display.as_str(), "WS    ");
    }

    #[test]
    fn test_builtin_airline_table() {
        let mapping = CodeMapping::airlines();
        assert_eq!(mapping.len(), AIRLINE_CODES.len());
        assert_eq!(lookup(Some("ACA"), &mapping), "AC");
        assert_eq!(lookup(Some("JZA"), &mapping), "QK");
        assert_eq!(lookup(Some("EZY"), &mapping), "U2");
        assert!(has_mapping(Some("shT"), &mapping));
    }
}
