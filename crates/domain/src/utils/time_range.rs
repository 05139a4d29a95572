//! Parsing of rendered clock ranges such as `"9:00 AM - 5:00 PM 8.00"`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ShiftParseError;

#[allow(clippy::expect_used)]
static ANNOTATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\[.*?\]").expect("ANNOTATION_REGEX should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}:\d{2}\s*[AaPp][Mm])\s*-\s*(\d{1,2}:\d{2}\s*[AaPp][Mm])\s*(\d+(?:\.\d+)?)?")
        .expect("RANGE_REGEX should compile - this is a bug")
});

/// Remove bracketed annotations, e.g. `"9:00 AM - 5:00 PM [Lunch]"` becomes
/// `"9:00 AM - 5:00 PM"`.
#[must_use]
pub fn strip_annotations(text: &str) -> String {
    ANNOTATION_REGEX.replace_all(text, "").trim().to_string()
}

/// Canonical clock text: `"9:00pm"` and `"9:00 PM"` both become `"9:00 PM"`.
#[must_use]
pub fn normalize_clock(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let upper = compact.to_ascii_uppercase();
    match upper.strip_suffix("AM").or_else(|| upper.strip_suffix("PM")) {
        Some(clock) if !clock.is_empty() => {
            let meridiem = &upper[clock.len()..];
            format!("{clock} {meridiem}")
        }
        _ => upper,
    }
}

/// Start, end and optional decimal length of a rendered shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
    pub length: Option<String>,
}

impl TimeRange {
    /// Parse `"H:MM AM - H:MM PM [optional decimal length]"`.
    ///
    /// Bracketed annotations are stripped first and both clock values come
    /// back in canonical form.
    ///
    /// # Errors
    /// Returns [`ShiftParseError::UnmatchedTimeRange`] when no range is found.
    pub fn parse(text: &str) -> Result<Self, ShiftParseError> {
        let cleaned = strip_annotations(text);
        let captures = RANGE_REGEX
            .captures(&cleaned)
            .ok_or_else(|| ShiftParseError::UnmatchedTimeRange { text: text.trim().to_string() })?;

        let start = captures.get(1).map(|m| normalize_clock(m.as_str()));
        let end = captures.get(2).map(|m| normalize_clock(m.as_str()));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                start,
                end,
                length: captures.get(3).map(|m| m.as_str().to_string()),
            }),
            _ => Err(ShiftParseError::UnmatchedTimeRange { text: text.trim().to_string() }),
        }
    }

    /// `"9:00 AM - 5:00 PM"`
    pub fn display_range(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bracketed_suffix() {
        assert_eq!(strip_annotations("9:00 AM - 5:00 PM [Lunch]"), "9:00 AM - 5:00 PM");
        assert_eq!(strip_annotations("9:00 AM [x] - 5:00 PM [y]"), "9:00 AM - 5:00 PM");
        assert_eq!(strip_annotations("no brackets"), "no brackets");
    }

    #[test]
    fn parses_range_with_length() {
        let range = TimeRange::parse("7:30 AM - 4:00 PM 8.50").unwrap();
        assert_eq!(range.start, "7:30 AM");
        assert_eq!(range.end, "4:00 PM");
        assert_eq!(range.length.as_deref(), Some("8.50"));
    }

    #[test]
    fn parses_compact_range_after_annotation() {
        let range = TimeRange::parse("9:00AM-5:00PM [Lunch]").unwrap();
        assert_eq!(range.display_range(), "9:00 AM - 5:00 PM");
        assert_eq!(range.length, None);
    }

    #[test]
    fn rejects_text_without_range() {
        let err = TimeRange::parse("All day").unwrap_err();
        assert_eq!(err, ShiftParseError::UnmatchedTimeRange { text: "All day".into() });
    }

    #[test]
    fn normalizes_clock_spelling() {
        assert_eq!(normalize_clock("9:00pm"), "9:00 PM");
        assert_eq!(normalize_clock(" 11:15  am "), "11:15 AM");
        assert_eq!(normalize_clock("noon"), "NOON");
    }
}
