//! Raw shift records as read from the schedule document

use serde::{Deserialize, Serialize};

use crate::errors::ShiftParseError;

/// A date as rendered by the schedule document, e.g. `"Mon Jan 06 2025"`.
///
/// Not a parsed date: the normalizer resolves it into weekday, month, day and
/// year tokens when it builds the event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateLabel(String);

impl DateLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into().trim().to_string())
    }

    /// Build a label from a rendered `datetime` attribute.
    ///
    /// The document renders values like
    /// `"Mon Jan 06 2025 00:00:00 GMT-0500 (Eastern Standard Time)"`.
    /// Everything from `" GMT"` on is dropped, then a trailing `HH:MM:SS`
    /// token is removed so the label ends at the year.
    pub fn from_attribute(raw: &str) -> Self {
        let head = raw.split(" GMT").next().unwrap_or(raw);
        let mut tokens: Vec<&str> = head.split_whitespace().collect();
        if tokens.last().is_some_and(|t| is_wall_clock(t)) {
            tokens.pop();
        }
        Self(tokens.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `[weekday, month, day, year]`.
    ///
    /// # Errors
    /// Returns [`ShiftParseError::MalformedDateLabel`] unless the label has
    /// exactly four whitespace-separated tokens.
    pub fn tokens(&self) -> Result<[&str; 4], ShiftParseError> {
        let tokens: Vec<&str> = self.0.split_whitespace().collect();
        match tokens.as_slice() {
            [weekday, month, day, year] => Ok([*weekday, *month, *day, *year]),
            _ => Err(ShiftParseError::MalformedDateLabel {
                label: self.0.clone(),
                found: tokens.len(),
            }),
        }
    }
}

impl std::fmt::Display for DateLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_wall_clock(token: &str) -> bool {
    token.split(':').count() == 3 && token.chars().all(|c| c.is_ascii_digit() || c == ':')
}

/// Time text of a shift, in whichever shape the document schema provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftTimes {
    /// One free-text range such as `"9:00 AM - 5:00 PM"`.
    Span(String),
    /// Start and end already separated by the extractor.
    Split { start: String, end: String },
}

/// Identity of a shift block within one extraction pass.
pub type DedupKey = (String, String, String, String, String);

/// One shift as read from the document, before any date parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawShift {
    pub day: DateLabel,
    pub times: ShiftTimes,
    pub detail: Option<String>,
    pub shift_length: Option<String>,
}

impl RawShift {
    pub fn span(day: DateLabel, span: impl Into<String>, detail: Option<String>) -> Self {
        Self { day, times: ShiftTimes::Span(span.into()), detail, shift_length: None }
    }

    pub fn split(
        day: DateLabel,
        start: impl Into<String>,
        end: impl Into<String>,
        detail: Option<String>,
        shift_length: Option<String>,
    ) -> Self {
        Self {
            day,
            times: ShiftTimes::Split { start: start.into(), end: end.into() },
            detail,
            shift_length,
        }
    }

    /// Tuple of (date, start text, end text, detail, length) used to drop
    /// blocks the document renders twice under different wrappers.
    pub fn dedup_key(&self) -> DedupKey {
        let (start, end) = match &self.times {
            ShiftTimes::Span(span) => (span.clone(), String::new()),
            ShiftTimes::Split { start, end } => (start.clone(), end.clone()),
        };
        (
            self.day.as_str().to_string(),
            start,
            end,
            self.detail.clone().unwrap_or_default(),
            self.shift_length.clone().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_is_cut_at_gmt_and_clock_dropped() {
        let label =
            DateLabel::from_attribute("Mon Jan 06 2025 00:00:00 GMT-0500 (Eastern Standard Time)");
        assert_eq!(label.as_str(), "Mon Jan 06 2025");
        assert_eq!(label.tokens().unwrap(), ["Mon", "Jan", "06", "2025"]);
    }

    #[test]
    fn attribute_without_clock_is_kept() {
        let label = DateLabel::from_attribute("Tue Jan 07 2025");
        assert_eq!(label.as_str(), "Tue Jan 07 2025");
    }

    #[test]
    fn malformed_label_reports_token_count() {
        let err = DateLabel::new("2025-01-06").tokens().unwrap_err();
        assert_eq!(
            err,
            ShiftParseError::MalformedDateLabel { label: "2025-01-06".into(), found: 1 }
        );
    }

    #[test]
    fn dedup_key_ignores_wrapper_and_keeps_fields() {
        let a = RawShift::split(
            DateLabel::new("Mon Jan 06 2025"),
            "9:00 AM",
            "5:00 PM",
            Some("Front Desk".into()),
            Some("8.00".into()),
        );
        let b = a.clone();
        assert_eq!(a.dedup_key(), b.dedup_key());

        let other = RawShift::split(
            DateLabel::new("Mon Jan 06 2025"),
            "9:00 AM",
            "5:00 PM",
            Some("Stockroom".into()),
            Some("8.00".into()),
        );
        assert_ne!(a.dedup_key(), other.dedup_key());
    }
}
