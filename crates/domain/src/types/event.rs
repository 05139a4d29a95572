//! Calendar events and their cross-run identity

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::ICS_EXTENSION;
use crate::errors::{Result, ShiftSyncError};

/// A fully specified calendar event derived from one shift.
///
/// `uid` is random per generated event and never used for matching; use
/// [`CalendarEvent::key`] to decide whether two events describe the same
/// shift.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// # Errors
    /// Returns `ShiftSyncError::Internal` when `start` is not before `end`.
    pub fn new(
        uid: impl Into<String>,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        summary: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if start >= end {
            return Err(ShiftSyncError::internal(format!(
                "event must start before it ends ({start} >= {end})"
            )));
        }
        Ok(Self { uid: uid.into(), start, end, summary: summary.into(), created_at })
    }

    pub fn key(&self) -> EventKey {
        EventKey::new(self.start.with_timezone(&Utc), self.end.with_timezone(&Utc), &self.summary)
    }

    /// Name of the interchange file for this event, `<uid>.ics`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.uid, ICS_EXTENSION)
    }
}

/// `(start, end, summary)` identity used to match events across runs.
///
/// Instants are compared in UTC so the same wall-clock shift written with a
/// `TZID` parameter or as a UTC timestamp yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
}

impl EventKey {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, summary: &str) -> Self {
        Self { start, end, summary: summary.trim().to_string() }
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} '{}'",
            self.start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.end.format("%Y-%m-%dT%H:%M:%SZ"),
            self.summary
        )
    }
}
