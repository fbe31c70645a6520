//! Fixed-width text payloads for the splitflap modules.

use serde::{Serialize, Serializer};
use std::fmt;

/// Default number of modules on a splitflap display.
pub const DEFAULT_WIDTH: usize = 6;

/// Text sized to exactly one character per display module.
///
/// The only constructors pad with spaces on the right or truncate from the
/// end, so `len()` always equals the width the text was built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayText {
    text: String,
    width: usize,
}

impl DisplayText {
    /// Fits arbitrary text to `width` modules.
    ///
    /// Longer input keeps its first `width` characters, shorter input is
    /// right-padded with spaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitflap_control::models::DisplayText;
    ///
    /// assert_eq!(DisplayText::fit("AA", 6).as_str(), "AA    ");
    /// assert_eq!(DisplayText::fit("SOMEUNKNOWN", 6).as_str(), "SOMEUN");
    /// ```
    #[must_use]
    pub fn fit(text: &str, width: usize) -> Self {
        let mut fitted: String = text.chars().take(width).collect();
        let count = fitted.chars().count();
        fitted.extend(std::iter::repeat(' ').take(width - count));
        Self {
            text: fitted,
            width,
        }
    }

    /// All-spaces text, used to reset every module.
    #[must_use]
    pub fn blank(width: usize) -> Self {
        Self {
            text: " ".repeat(width),
            width,
        }
    }

    /// The same character on every module.
    #[must_use]
    pub fn repeated(character: char, width: usize) -> Self {
        Self {
            text: std::iter::repeat(character).take(width).collect(),
            width,
        }
    }

    /// Returns the padded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of modules this text addresses.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Character count, always equal to [`width`](Self::width).
    #[must_use]
    pub fn len(&self) -> usize {
        self.width
    }

    /// True for zero-width displays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Consumes the text, returning the padded string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for DisplayText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl Serialize for DisplayText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_short_text() {
        let text = DisplayText::fit("AC", 6);
        assert_eq!(text.as_str(), "AC    ");
        assert_eq!(text.len(), 6);
    }

    #[test]
    fn test_fit_truncates_long_text() {
        let text = DisplayText::fit("14:05:09", 6);
        assert_eq!(text.as_str(), "14:05:");
    }

    #[test]
    fn test_fit_counts_chars_not_bytes() {
        let text = DisplayText::fit("ÉÉÉÉÉÉÉÉ", 4);
        assert_eq!(text.as_str(), "ÉÉÉÉ");
        assert_eq!(text.as_str().chars().count(), 4);
    }

    #[test]
    fn test_blank_and_repeated() {
        assert_eq!(DisplayText::blank(6).as_str(), "      ");
        assert_eq!(DisplayText::repeated('A', 3).as_str(), "AAA");
    }

    #[test]
    fn test_zero_width() {
        let text = DisplayText::fit("ANY", 0);
        assert!(text.is_empty());
        assert_eq!(text.as_str(), "");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&DisplayText::fit("YYC", 6)).unwrap();
        assert_eq!(json, "\"YYC   \"");
    }
}
