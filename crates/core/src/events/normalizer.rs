//! Raw shift to calendar event conversion

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use shiftsync_domain::constants::PLACEHOLDER_DETAIL;
use shiftsync_domain::utils::time_range::normalize_clock;
use shiftsync_domain::{
    CalendarEvent, EventsConfig, RawShift, Result, ScheduleConfig, ShiftParseError, ShiftTimes,
    SummaryStyle, TimeRange,
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::localize;

const LOCAL_FORMAT: &str = "%a %b %d %Y %I:%M %p";
const SUMMARY_CLOCK_FORMAT: &str = "%I:%M %p";

/// Events built from one extraction, plus how many shifts were dropped.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub events: Vec<CalendarEvent>,
    pub skipped: usize,
}

/// Turns raw shifts into zoned calendar events.
///
/// Every shift is read as wall-clock time in one fixed zone.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    zone: Tz,
    style: SummaryStyle,
    uid_domain: String,
}

impl EventNormalizer {
    pub fn new(zone: Tz, style: SummaryStyle, uid_domain: impl Into<String>) -> Self {
        Self { zone, style, uid_domain: uid_domain.into() }
    }

    /// # Errors
    /// Returns `ShiftSyncError::Config` for an unknown time zone.
    pub fn from_config(schedule: &ScheduleConfig, events: &EventsConfig) -> Result<Self> {
        Ok(Self::new(schedule.zone()?, schedule.summary_style(), events.uid_domain.clone()))
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Normalize every shift, logging and skipping the ones that fail.
    pub fn normalize_all(&self, shifts: Vec<RawShift>) -> NormalizedBatch {
        let now = Utc::now();
        let mut batch = NormalizedBatch::default();
        for shift in shifts {
            match self.normalize_at(&shift, now) {
                Ok(event) => batch.events.push(event),
                Err(err) => {
                    warn!(date = %shift.day, error = %err, "Skipping shift");
                    batch.skipped += 1;
                }
            }
        }
        batch
    }

    /// # Errors
    /// A [`ShiftParseError`] describing why this one shift is unusable.
    pub fn normalize(
        &self,
        shift: &RawShift,
    ) -> std::result::Result<CalendarEvent, ShiftParseError> {
        self.normalize_at(shift, Utc::now())
    }

    /// Same as [`normalize`](Self::normalize) with an explicit creation time.
    ///
    /// # Errors
    /// A [`ShiftParseError`] describing why this one shift is unusable.
    pub fn normalize_at(
        &self,
        shift: &RawShift,
        created_at: DateTime<Utc>,
    ) -> std::result::Result<CalendarEvent, ShiftParseError> {
        let date = shift.day.tokens()?.join(" ");

        let (start_clock, end_clock, span_length) = match &shift.times {
            ShiftTimes::Span(span) => {
                let range = TimeRange::parse(span)?;
                (range.start, range.end, range.length)
            }
            ShiftTimes::Split { start, end } => {
                (normalize_clock(start), normalize_clock(end), None)
            }
        };
        let length = span_length.or_else(|| shift.shift_length.clone());

        let start_naive = parse_local(&date, &start_clock)?;
        let mut end_naive = parse_local(&date, &end_clock)?;
        if end_naive <= start_naive {
            debug!(date = %date, "Shift ends after midnight, rolling end to next day");
            end_naive += Duration::days(1);
        }

        let start = self.localize(start_naive)?;
        let end = self.localize(end_naive)?;
        let summary = self.summary(&start, &end, shift.detail.as_deref(), length.as_deref());
        let uid = format!("{}@{}", Uuid::new_v4(), self.uid_domain);

        debug!(uid = %uid, summary = %summary, "Event built");
        Ok(CalendarEvent { uid, start, end, summary, created_at })
    }

    fn localize(&self, naive: NaiveDateTime) -> std::result::Result<DateTime<Tz>, ShiftParseError> {
        localize(self.zone, naive).ok_or_else(|| ShiftParseError::NonexistentLocalTime {
            text: naive.format("%Y-%m-%d %H:%M").to_string(),
            zone: self.zone.name().to_string(),
        })
    }

    fn summary(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        detail: Option<&str>,
        length: Option<&str>,
    ) -> String {
        let detail = detail.map(str::trim).filter(|d| !d.is_empty() && *d != PLACEHOLDER_DETAIL);
        let fallback = || length.map(|l| format!("{l} hrs")).unwrap_or_default();
        let text = detail.map(str::to_string).unwrap_or_else(fallback);

        match self.style {
            SummaryStyle::Verbatim => text,
            SummaryStyle::ClockRange => {
                let range = format!(
                    "{} - {}",
                    start.format(SUMMARY_CLOCK_FORMAT),
                    end.format(SUMMARY_CLOCK_FORMAT)
                );
                if text.is_empty() {
                    range
                } else {
                    format!("{range}: {text}")
                }
            }
        }
    }
}

fn parse_local(date: &str, clock: &str) -> std::result::Result<NaiveDateTime, ShiftParseError> {
    let text = format!("{date} {clock}");
    NaiveDateTime::parse_from_str(&text, LOCAL_FORMAT)
        .map_err(|_| ShiftParseError::InvalidDateTime { text })
}
