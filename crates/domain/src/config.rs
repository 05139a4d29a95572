//! Configuration management
//!
//! One immutable [`Config`] value is built at startup (see the infra
//! loader) and passed into the pipeline. Every section except `portal`,
//! `schedule` and `store` has complete defaults.

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_NAME, DEFAULT_CONTAINER_TIMEOUT, DEFAULT_DIAGNOSTICS_DIR,
    DEFAULT_FALLBACK_SETTLE, DEFAULT_INTERACTION_ATTEMPTS, DEFAULT_INTERACTION_BACKOFF,
    DEFAULT_INTERACTION_WAIT, DEFAULT_LOGIN_SETTLE, DEFAULT_LOG_FILE, DEFAULT_PAGE_SOURCE_DUMP,
    DEFAULT_POLL_INTERVAL, DEFAULT_PRODID, DEFAULT_REDIRECT_TIMEOUT, DEFAULT_SCHEDULE_SETTLE,
    DEFAULT_TIMEZONE, DEFAULT_TOTP_DIGITS, DEFAULT_TOTP_STEP_SECS, DEFAULT_UID_DOMAIN,
};
use crate::errors::{Result, ShiftSyncError};
use crate::impl_config_enum_conversions;
use crate::types::Locator;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub portal: PortalConfig,
    pub schedule: ScheduleConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scheduling portal and login flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub login_url: String,
    pub schedule_url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub totp_secret: String,
    #[serde(default)]
    pub totp: TotpConfig,
    #[serde(default)]
    pub login_form: LoginFormConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TotpAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl_config_enum_conversions!(TotpAlgorithm {
    Sha1 => "sha1",
    Sha256 => "sha256",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    pub algorithm: TotpAlgorithm,
    pub digits: u32,
    pub step_secs: u64,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            algorithm: TotpAlgorithm::Sha1,
            digits: DEFAULT_TOTP_DIGITS,
            step_secs: DEFAULT_TOTP_STEP_SECS,
        }
    }
}

/// Locators of the username, password and one-time-code forms
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginFormConfig {
    pub username_field: Locator,
    pub username_next: Locator,
    pub password_field: Locator,
    pub password_submit: Locator,
    pub code_field: Locator,
    pub code_submit: Locator,
}

impl Default for LoginFormConfig {
    fn default() -> Self {
        Self {
            username_field: Locator::name("loginfmt"),
            username_next: Locator::id("idSIButton9"),
            password_field: Locator::name("passwd"),
            password_submit: Locator::id("idSIButton9"),
            code_field: Locator::name("otc"),
            code_submit: Locator::id("idSubmit_SAOTCC_Continue"),
        }
    }
}

/// Which markup the schedule document uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// One time node and one details node per shift block.
    Simple,
    /// Separate time-range and detail-line elements, duplicate blocks.
    #[default]
    Rich,
}

impl_config_enum_conversions!(SchemaVariant {
    Simple => "simple",
    Rich => "rich",
});

/// How event summaries are built from shift details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    /// The detail text as-is.
    Verbatim,
    /// `"09:00 AM - 05:00 PM: <detail>"`, hours zero-padded.
    ClockRange,
}

impl_config_enum_conversions!(SummaryStyle {
    Verbatim => "verbatim",
    ClockRange => "clock_range",
});

/// Optional replacements for the built-in selectors of a schema variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorOverrides {
    pub container: Option<String>,
    pub day: Option<String>,
    pub date_attribute: Option<String>,
    pub shift: Option<String>,
    pub time: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub variant: SchemaVariant,
    #[serde(default)]
    pub selectors: SelectorOverrides,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_container_timeout")]
    pub container_timeout_secs: u64,
    #[serde(default = "default_schedule_settle")]
    pub settle_secs: u64,
    #[serde(default)]
    pub summary_style: Option<SummaryStyle>,
}

impl ScheduleConfig {
    /// # Errors
    /// Returns `ShiftSyncError::Config` for names unknown to the tz database.
    pub fn zone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ShiftSyncError::config(format!("Unknown time zone: {}", self.timezone)))
    }

    /// Configured summary style, or the one matching the schema variant.
    pub fn summary_style(&self) -> SummaryStyle {
        self.summary_style.unwrap_or(match self.variant {
            SchemaVariant::Simple => SummaryStyle::Verbatim,
            SchemaVariant::Rich => SummaryStyle::ClockRange,
        })
    }

    pub fn container_timeout(&self) -> Duration {
        Duration::from_secs(self.container_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

/// Remote calendar store flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Plain collection URL, one `PUT <url>/<uid>.ics` per event.
    #[default]
    Webdav,
    /// Server with principal discovery and named calendars.
    Caldav,
}

impl_config_enum_conversions!(StoreKind {
    Webdav => "webdav",
    Caldav => "caldav",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    pub url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(default = "default_calendar")]
    pub calendar: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_http_attempts")]
    pub http_attempts: u32,
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Retry, wait and settle timings for document interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub attempts: u32,
    pub wait_timeout_secs: u64,
    pub backoff_secs: u64,
    pub redirect_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub fallback_settle_secs: u64,
    pub login_settle_secs: u64,
}

impl InteractionConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_secs(self.redirect_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fallback_settle(&self) -> Duration {
        Duration::from_secs(self.fallback_settle_secs)
    }

    pub fn login_settle(&self) -> Duration {
        Duration::from_secs(self.login_settle_secs)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_INTERACTION_ATTEMPTS,
            wait_timeout_secs: DEFAULT_INTERACTION_WAIT.as_secs(),
            backoff_secs: DEFAULT_INTERACTION_BACKOFF.as_secs(),
            redirect_timeout_secs: DEFAULT_REDIRECT_TIMEOUT.as_secs(),
            poll_interval_ms: u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(500),
            fallback_settle_secs: DEFAULT_FALLBACK_SETTLE.as_secs(),
            login_settle_secs: DEFAULT_LOGIN_SETTLE.as_secs(),
        }
    }
}

/// Browser automation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    pub endpoint: String,
    pub headless: bool,
    pub window_size: String,
    pub browser_args: Vec<String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            headless: true,
            window_size: "1920,1080".to_string(),
            browser_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for `<uid>.ics` files; `None` keeps the batch in memory.
    pub staging_dir: Option<PathBuf>,
    /// Keep staged files of events that were published.
    pub retain_published: bool,
    pub diagnostics_dir: PathBuf,
    pub page_source_dump: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            staging_dir: None,
            retain_published: true,
            diagnostics_dir: PathBuf::from(DEFAULT_DIAGNOSTICS_DIR),
            page_source_dump: PathBuf::from(DEFAULT_PAGE_SOURCE_DUMP),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub uid_domain: String,
    pub prodid: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { uid_domain: DEFAULT_UID_DOMAIN.to_string(), prodid: DEFAULT_PRODID.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl_config_enum_conversions!(LogFormat {
    Text => "text",
    Json => "json",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Plain-text log file; `None` logs to stderr only.
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { file: Some(PathBuf::from(DEFAULT_LOG_FILE)), format: LogFormat::Text }
    }
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_container_timeout() -> u64 {
    DEFAULT_CONTAINER_TIMEOUT.as_secs()
}

fn default_schedule_settle() -> u64 {
    DEFAULT_SCHEDULE_SETTLE.as_secs()
}

fn default_calendar() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_http_attempts() -> u32 {
    3
}

impl Config {
    /// Reject configurations the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns `ShiftSyncError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_url("portal.login_url", &self.portal.login_url)?;
        require_url("portal.schedule_url", &self.portal.schedule_url)?;
        require_url("store.url", &self.store.url)?;
        require_url("webdriver.endpoint", &self.webdriver.endpoint)?;
        require("portal.username", &self.portal.username)?;
        require("portal.password", &self.portal.password)?;
        require("portal.totp_secret", &self.portal.totp_secret)?;
        require("store.username", &self.store.username)?;
        require("store.password", &self.store.password)?;
        require("store.calendar", &self.store.calendar)?;
        require("events.uid_domain", &self.events.uid_domain)?;

        self.schedule.zone()?;

        if self.interaction.attempts == 0 {
            return Err(ShiftSyncError::config("interaction.attempts must be at least 1"));
        }
        if self.store.http_attempts == 0 {
            return Err(ShiftSyncError::config("store.http_attempts must be at least 1"));
        }
        if !(6..=8).contains(&self.portal.totp.digits) {
            return Err(ShiftSyncError::config("portal.totp.digits must be between 6 and 8"));
        }
        if self.portal.totp.step_secs == 0 {
            return Err(ShiftSyncError::config("portal.totp.step_secs must be positive"));
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ShiftSyncError::config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ShiftSyncError::config(format!("{field} must be an http(s) URL: {value}")));
    }
    Ok(())
}
