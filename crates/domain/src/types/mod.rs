//! Domain types for shifts, calendar events and document locators

pub mod event;
pub mod locator;
pub mod shift;

pub use event::{CalendarEvent, EventKey};
pub use locator::Locator;
pub use shift::{DateLabel, DedupKey, RawShift, ShiftTimes};
