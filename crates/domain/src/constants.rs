//! Application constants
//!
//! Defaults observed on the scheduling portal and the sync target. Every
//! value here can be overridden through configuration.

use std::time::Duration;

// Interaction policy
pub const DEFAULT_INTERACTION_ATTEMPTS: u32 = 5;
pub const DEFAULT_INTERACTION_WAIT: Duration = Duration::from_secs(20);
pub const DEFAULT_INTERACTION_BACKOFF: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

// Session acquisition
pub const DEFAULT_REDIRECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOGIN_SETTLE: Duration = Duration::from_secs(5);
pub const DEFAULT_FALLBACK_SETTLE: Duration = Duration::from_secs(10);

// Schedule document
pub const DEFAULT_CONTAINER_TIMEOUT: Duration = Duration::from_secs(40);
pub const DEFAULT_SCHEDULE_SETTLE: Duration = Duration::from_secs(10);
pub const PLACEHOLDER_DETAIL: &str = "No details available";
pub const DEFAULT_DATE_ATTRIBUTE: &str = "datetime";

// Calendar events
pub const DEFAULT_TIMEZONE: &str = "US/Eastern";
pub const DEFAULT_CALENDAR_NAME: &str = "personal";
pub const DEFAULT_UID_DOMAIN: &str = "shiftsync.local";
pub const DEFAULT_PRODID: &str = "-//ShiftSync//Schedule Sync//EN";
pub const ICS_EXTENSION: &str = "ics";

// One-time codes
pub const DEFAULT_TOTP_DIGITS: u32 = 6;
pub const DEFAULT_TOTP_STEP_SECS: u64 = 30;

// Diagnostics
pub const DEFAULT_DIAGNOSTICS_DIR: &str = "screenshots";
pub const DEFAULT_PAGE_SOURCE_DUMP: &str = "page_source_error.html";
pub const DEFAULT_LOG_FILE: &str = "schedule_sync.log";
