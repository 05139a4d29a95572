//! Shared test helpers for `shiftsync-core` integration tests.
//!
//! In-memory fakes for every core port plus a ready-made configuration, so
//! pipeline tests can focus on behaviour instead of wiring.

#![allow(dead_code)]

pub mod browser;
pub mod staging;
pub mod store;

use std::path::PathBuf;

use shiftsync_domain::{
    Config, EventsConfig, InteractionConfig, LoggingConfig, PathsConfig, PortalConfig,
    ScheduleConfig, SchemaVariant, SelectorOverrides, StoreConfig, StoreKind, WebDriverConfig,
};

pub const LOGIN_URL: &str = "https://login.portal.test/";
pub const SCHEDULE_URL: &str = "https://portal.test/schedule";

/// Configuration for a rich-schema portal and a `Personal` calendar.
pub fn test_config() -> Config {
    Config {
        portal: PortalConfig {
            login_url: LOGIN_URL.into(),
            schedule_url: SCHEDULE_URL.into(),
            username: "worker@portal.test".into(),
            password: "hunter2".into(),
            totp_secret: "GEZDGNBVGY3TQOJQ".into(),
            totp: Default::default(),
            login_form: Default::default(),
        },
        schedule: ScheduleConfig {
            variant: SchemaVariant::Rich,
            selectors: SelectorOverrides::default(),
            timezone: "US/Eastern".into(),
            container_timeout_secs: 40,
            settle_secs: 10,
            summary_style: None,
        },
        store: StoreConfig {
            kind: StoreKind::Caldav,
            url: "https://dav.test/".into(),
            username: "worker".into(),
            password: "secret".into(),
            calendar: "personal".into(),
            request_timeout_secs: 30,
            http_attempts: 3,
        },
        interaction: InteractionConfig::default(),
        webdriver: WebDriverConfig::default(),
        paths: PathsConfig { staging_dir: None, ..PathsConfig::default() },
        events: EventsConfig::default(),
        logging: LoggingConfig { file: None, ..LoggingConfig::default() },
    }
}

/// Rendered rich-schema schedule: Front Desk on Jan 6 (rendered twice) and
/// a closing shift on Jan 7 with no detail line.
pub const RICH_SCHEDULE: &str = r#"
<html><head><title>My Schedule</title></head><body>
<ul class="schedule">
  <li class="withDivider" datetime="Mon Jan 06 2025 00:00:00 GMT-0500 (Eastern Standard Time)">
    <div class="scheduleEntityWrapper">
      <p class="props">9:00 AM - 5:00 PM 8.00</p>
      <p class="label">Front Desk</p>
    </div>
    <div class="shiftPosition">
      <p class="props">9:00 AM - 5:00 PM 8.00</p>
      <p class="label">Front Desk</p>
    </div>
  </li>
  <li class="withDivider" datetime="Tue Jan 07 2025 00:00:00 GMT-0500 (Eastern Standard Time)">
    <div class="scheduleEntityWrapper">
      <time class="label">1:00 PM - 9:30 PM [Close] 8.50</time>
    </div>
  </li>
</ul>
</body></html>"#;

/// Summary the rich schema produces for the Front Desk shift.
pub const FRONT_DESK_SUMMARY: &str = "09:00 AM - 05:00 PM: Front Desk";

pub fn artifact_path(name: &str) -> PathBuf {
    PathBuf::from(format!("screenshots/{name}.png"))
}
