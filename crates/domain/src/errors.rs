//! Error types used throughout the sync pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for ShiftSync
///
/// Variants split into two groups: failures local to one data item (one
/// shift, one remote event, one upload) and failures that invalidate the
/// whole run. Use [`ShiftSyncError::is_fatal`] to tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShiftSyncError {
    #[error("Interaction with {locator} failed after {attempts} attempts")]
    InteractionExhausted { locator: String, attempts: u32 },

    #[error("Redirection to {expected} did not happen (landed on {actual})")]
    RedirectionTimeout { expected: String, actual: String },

    #[error("Shift parse error: {message}")]
    ShiftParse { message: String },

    #[error("Calendar not found: {name}")]
    CalendarNotFound { name: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Timed out: {message}")]
    Timeout { message: String },

    #[error("Document error: {message}")]
    Document { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ShiftSyncError {
    pub fn shift_parse(message: impl Into<String>) -> Self {
        Self::ShiftParse { message: message.into() }
    }

    pub fn calendar_not_found(name: impl Into<String>) -> Self {
        Self::CalendarNotFound { name: name.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout { message: message.into() }
    }

    pub fn document(message: impl Into<String>) -> Self {
        Self::Document { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether this error compromises the validity of the whole run.
    ///
    /// Redirection timeouts are recovered through fallback navigation and
    /// shift parse errors only skip one shift. Transport errors are fatal
    /// here because item-level callers (the publisher) catch them before
    /// they reach the top level.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::RedirectionTimeout { .. } | Self::ShiftParse { .. })
    }

    /// Whether the error came from a bounded wait running out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InteractionExhausted { .. } => "interaction_exhausted",
            Self::RedirectionTimeout { .. } => "redirection_timeout",
            Self::ShiftParse { .. } => "shift_parse",
            Self::CalendarNotFound { .. } => "calendar_not_found",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Document { .. } => "document",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<std::io::Error> for ShiftSyncError {
    fn from(value: std::io::Error) -> Self {
        Self::io(value.to_string())
    }
}

/// Why a single shift could not become a calendar event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShiftParseError {
    #[error("date label '{label}' does not have exactly four tokens (found {found})")]
    MalformedDateLabel { label: String, found: usize },

    #[error("time range '{text}' does not match 'H:MM AM - H:MM PM'")]
    UnmatchedTimeRange { text: String },

    #[error("'{text}' is not a valid local date and time")]
    InvalidDateTime { text: String },

    #[error("'{text}' does not exist in time zone {zone}")]
    NonexistentLocalTime { text: String, zone: String },
}

impl From<ShiftParseError> for ShiftSyncError {
    fn from(value: ShiftParseError) -> Self {
        ShiftSyncError::shift_parse(value.to_string())
    }
}

/// Result type alias for ShiftSync operations
pub type Result<T> = std::result::Result<T, ShiftSyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_level_errors_are_not_fatal() {
        assert!(!ShiftSyncError::shift_parse("bad").is_fatal());
        assert!(!ShiftSyncError::RedirectionTimeout {
            expected: "https://portal".into(),
            actual: "https://login".into(),
        }
        .is_fatal());
    }

    #[test]
    fn run_level_errors_are_fatal() {
        assert!(ShiftSyncError::calendar_not_found("personal").is_fatal());
        assert!(ShiftSyncError::InteractionExhausted { locator: "id=next".into(), attempts: 5 }
            .is_fatal());
        assert!(ShiftSyncError::transport("connection refused").is_fatal());
    }

    #[test]
    fn exhausted_error_names_locator_and_attempts() {
        let err =
            ShiftSyncError::InteractionExhausted { locator: "id=idSIButton9".into(), attempts: 5 };
        assert_eq!(err.to_string(), "Interaction with id=idSIButton9 failed after 5 attempts");
        assert_eq!(err.label(), "interaction_exhausted");
    }

    #[test]
    fn shift_parse_error_converts() {
        let err: ShiftSyncError =
            ShiftParseError::MalformedDateLabel { label: "Mon Jan".into(), found: 2 }.into();
        assert_eq!(err.label(), "shift_parse");
        assert!(err.to_string().contains("exactly four tokens"));
    }

    #[test]
    fn errors_serialize_with_type_tag() {
        let err = ShiftSyncError::calendar_not_found("personal");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "CalendarNotFound");
        assert_eq!(json["name"], "personal");
    }
}
