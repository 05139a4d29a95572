//! iCalendar (RFC 5545) encoding of generated events and decoding of
//! remote ones into match keys

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use shiftsync_domain::{CalendarEvent, EventKey, Result, ShiftSyncError};

use super::localize;

const CRLF: &str = "\r\n";
const MAX_LINE_OCTETS: usize = 75;
const LOCAL_STAMP: &str = "%Y%m%dT%H%M%S";
const UTC_STAMP: &str = "%Y%m%dT%H%M%SZ";

/// Serialize one event as a standalone `VCALENDAR` document.
pub fn encode_event(event: &CalendarEvent, prodid: &str) -> String {
    let zone = event.start.timezone().name();
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{prodid}"),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", event.uid),
        format!("DTSTAMP:{}", event.created_at.format(UTC_STAMP)),
        format!("DTSTART;TZID={zone}:{}", event.start.format(LOCAL_STAMP)),
        format!("DTEND;TZID={}:{}", event.end.timezone().name(), event.end.format(LOCAL_STAMP)),
        format!("SUMMARY:{}", escape_text(&event.summary)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut out = String::new();
    for line in &lines {
        fold_into(&mut out, line);
    }
    out
}

/// A remote `VEVENT` reduced to what matching needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub uid: Option<String>,
    pub key: EventKey,
}

/// Decode every `VEVENT` in `ics`.
///
/// Events are returned one by one so a caller can drop the unreadable ones
/// without losing the rest. Floating and all-day times are read in
/// `default_zone`.
pub fn decode_events(ics: &str, default_zone: Tz) -> Vec<Result<DecodedEvent>> {
    let mut decoded = Vec::new();
    for calendar in ical::IcalParser::new(ics.as_bytes()) {
        match calendar {
            Ok(calendar) => {
                let events = calendar.events.iter().map(|event| decode_event(event, default_zone));
                decoded.extend(events);
            }
            Err(err) => {
                let message = format!("iCalendar parse error: {err}");
                decoded.push(Err(ShiftSyncError::document(message)));
                break;
            }
        }
    }
    decoded
}

fn decode_event(event: &IcalEvent, zone: Tz) -> Result<DecodedEvent> {
    let uid = property(event, "UID").and_then(|p| p.value.clone());
    let label = uid.as_deref().unwrap_or("<no uid>");

    let start = property(event, "DTSTART")
        .ok_or_else(|| ShiftSyncError::document(format!("event {label} has no DTSTART")))
        .and_then(|p| instant(p, zone))?;
    let end = property(event, "DTEND")
        .ok_or_else(|| ShiftSyncError::document(format!("event {label} has no DTEND")))
        .and_then(|p| instant(p, zone))?;
    let summary = property(event, "SUMMARY")
        .ok_or_else(|| ShiftSyncError::document(format!("event {label} has no SUMMARY")))?
        .value
        .as_deref()
        .map(unescape_text)
        .unwrap_or_default();

    Ok(DecodedEvent { uid, key: EventKey::new(start, end, &summary) })
}

fn property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

/// Resolve a `DTSTART`/`DTEND` property into a UTC instant.
fn instant(property: &Property, default_zone: Tz) -> Result<DateTime<Utc>> {
    let value = property
        .value
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| ShiftSyncError::document(format!("{} has no value", property.name)))?;
    let bad_value =
        || ShiftSyncError::document(format!("unreadable {} value '{value}'", property.name));

    let is_date = param(property, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));
    if is_date {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| bad_value())?;
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(bad_value)?;
        return zoned(default_zone, midnight, value);
    }

    if value.ends_with('Z') {
        let naive = NaiveDateTime::parse_from_str(value, UTC_STAMP).map_err(|_| bad_value())?;
        return Ok(Utc.from_utc_datetime(&naive));
    }

    let naive = NaiveDateTime::parse_from_str(value, LOCAL_STAMP).map_err(|_| bad_value())?;
    let zone = match param(property, "TZID") {
        Some(tzid) => tzid
            .trim_matches('"')
            .parse::<Tz>()
            .map_err(|_| ShiftSyncError::document(format!("unknown TZID '{tzid}'")))?,
        None => default_zone,
    };
    zoned(zone, naive, value)
}

fn zoned(zone: Tz, naive: NaiveDateTime, value: &str) -> Result<DateTime<Utc>> {
    localize(zone, naive).map(|dt| dt.with_timezone(&Utc)).ok_or_else(|| {
        ShiftSyncError::document(format!("'{value}' does not exist in {}", zone.name()))
    })
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Append `line` folded at 75 octets, never splitting a UTF-8 sequence.
fn fold_into(out: &mut String, line: &str) {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str(CRLF);
            out.push(' ');
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out.push_str(CRLF);
}
