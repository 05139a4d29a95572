//! Shared fixtures for store adapter tests

#![allow(dead_code)]

use shiftsync_domain::{StoreConfig, StoreKind};
use shiftsync_infra::HttpClient;

pub const USERNAME: &str = "worker";
pub const PASSWORD: &str = "s3cret";

/// Store settings pointing at `url` with the test credentials.
pub fn store_config(kind: StoreKind, url: &str) -> StoreConfig {
    StoreConfig {
        kind,
        url: url.to_string(),
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
        calendar: "personal".to_string(),
        request_timeout_secs: 5,
        http_attempts: 1,
    }
}

/// Client that fails fast instead of retrying.
pub fn single_shot_client() -> HttpClient {
    HttpClient::builder().max_attempts(1).build().expect("http client")
}

/// Calendar holding the Front Desk shift of 2025-01-06 in UTC.
pub const FRONT_DESK_ICS: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Other//EN\r\n\
BEGIN:VEVENT\r\nUID:created-elsewhere\r\nDTSTAMP:20241230T000000Z\r\n\
DTSTART:20250106T140000Z\r\nDTEND:20250106T220000Z\r\n\
SUMMARY:09:00 AM - 05:00 PM: Front Desk\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

/// Calendar holding an overnight shift written with a TZID.
pub const CLOSE_ICS: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Other//EN\r\n\
BEGIN:VEVENT\r\nUID:close-shift\r\nDTSTAMP:20241230T000000Z\r\n\
DTSTART;TZID=US/Eastern:20250107T130000\r\nDTEND;TZID=US/Eastern:20250107T213000\r\n\
SUMMARY:8.50 hrs\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

/// Multistatus body wrapping one `<response>` per entry.
pub fn multistatus(entries: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <d:multistatus xmlns:d=\"DAV:\" xmlns:c=\"{CALDAV}\">{}</d:multistatus>",
        entries.concat()
    )
}

/// `<response>` with the given href and raw `<d:prop>` content.
pub fn response(href: &str, props: &str) -> String {
    format!(
        "<d:response><d:href>{href}</d:href><d:propstat><d:prop>{props}</d:prop>\
         <d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"
    )
}
