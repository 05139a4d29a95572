//! Calendar event construction and the iCalendar codec

pub mod ics;
pub mod normalizer;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

pub use ics::{decode_events, encode_event, DecodedEvent};
pub use normalizer::{EventNormalizer, NormalizedBatch};

/// Attach `zone` to a wall-clock time.
///
/// Ambiguous times (the repeated hour when clocks fall back) resolve to
/// standard time, the later of the two instants. Times skipped when clocks
/// spring forward have no instant and yield `None`.
pub(crate) fn localize(zone: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(_, latest) => Some(latest),
        LocalResult::None => None,
    }
}
