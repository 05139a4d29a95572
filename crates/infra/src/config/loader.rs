//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. When every required variable is set, loads from environment variables
//!    and reports any invalid value as an error
//! 2. If a required variable is missing, falls back to loading from file
//! 3. The file is `SHIFTSYNC_CONFIG` when set, otherwise the first match
//!    among the searched paths
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `SHIFTSYNC_LOGIN_URL`, `SHIFTSYNC_SCHEDULE_URL`: portal pages
//! - `SHIFTSYNC_USERNAME`, `SHIFTSYNC_PASSWORD`: portal credentials
//! - `SHIFTSYNC_TOTP_SECRET`: base32 one-time-code secret
//! - `SHIFTSYNC_STORE_URL`, `SHIFTSYNC_STORE_USERNAME`,
//!   `SHIFTSYNC_STORE_PASSWORD`: calendar store
//!
//! Optional:
//! - `SHIFTSYNC_STORE_KIND`: `webdav` or `caldav`
//! - `SHIFTSYNC_CALENDAR`: target calendar name
//! - `SHIFTSYNC_SCHEMA`: `simple` or `rich`
//! - `SHIFTSYNC_TIMEZONE`: tz database name
//! - `SHIFTSYNC_TOTP_ALGORITHM`: `sha1` or `sha256`
//! - `SHIFTSYNC_WEBDRIVER_URL`: driver endpoint
//! - `SHIFTSYNC_HEADLESS`: run the browser headless (true/false)
//! - `SHIFTSYNC_STAGING_DIR`: stage `<uid>.ics` files here
//! - `SHIFTSYNC_DIAGNOSTICS_DIR`: screenshot directory
//! - `SHIFTSYNC_LOG_FILE`: log file path, empty to disable
//! - `SHIFTSYNC_LOG_FORMAT`: `text` or `json`
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./shiftsync.{toml,json}` and `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::json;
use shiftsync_domain::{
    Config, LogFormat, Result, SchemaVariant, ShiftSyncError, StoreKind, TotpAlgorithm,
};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "SHIFTSYNC_CONFIG";

const FILE_NAMES: [&str; 4] = ["shiftsync.toml", "shiftsync.json", "config.toml", "config.json"];

/// Required environment variables; the file fallback applies only when one is unset.
const REQUIRED_VARS: [&str; 8] = [
    "SHIFTSYNC_LOGIN_URL",
    "SHIFTSYNC_SCHEDULE_URL",
    "SHIFTSYNC_USERNAME",
    "SHIFTSYNC_PASSWORD",
    "SHIFTSYNC_TOTP_SECRET",
    "SHIFTSYNC_STORE_URL",
    "SHIFTSYNC_STORE_USERNAME",
    "SHIFTSYNC_STORE_PASSWORD",
];

/// Load configuration with automatic fallback strategy
///
/// Loads from environment variables when all required ones are set. If any
/// is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ShiftSyncError::Config` if:
/// - An environment variable holds an invalid value
/// - No config file is found while a required variable is missing
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match missing_required_var() {
        None => load_from_env(),
        Some(missing) => {
            let explicit = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
            load_from_file(explicit).map_err(|e| match e {
                ShiftSyncError::Config { message } => {
                    ShiftSyncError::config(format!("{missing} is not set; {message}"))
                }
                other => other,
            })
        }
    }
}

/// First required variable that is unset or blank.
fn missing_required_var() -> Option<&'static str> {
    REQUIRED_VARS.into_iter().find(|key| env_opt(key).is_none())
}

/// Load configuration from environment variables
///
/// Sections without a variable keep their defaults.
///
/// # Errors
/// Returns `ShiftSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let base = json!({
        "portal": {
            "login_url": env_var("SHIFTSYNC_LOGIN_URL")?,
            "schedule_url": env_var("SHIFTSYNC_SCHEDULE_URL")?,
            "username": env_var("SHIFTSYNC_USERNAME")?,
            "password": env_var("SHIFTSYNC_PASSWORD")?,
            "totp_secret": env_var("SHIFTSYNC_TOTP_SECRET")?,
        },
        "schedule": {},
        "store": {
            "url": env_var("SHIFTSYNC_STORE_URL")?,
            "username": env_var("SHIFTSYNC_STORE_USERNAME")?,
            "password": env_var("SHIFTSYNC_STORE_PASSWORD")?,
        },
    });
    let mut config: Config = serde_json::from_value(base)
        .map_err(|e| ShiftSyncError::config(format!("Invalid environment configuration: {e}")))?;

    if let Some(kind) = env_parse::<StoreKind>("SHIFTSYNC_STORE_KIND")? {
        config.store.kind = kind;
    }
    if let Some(calendar) = env_opt("SHIFTSYNC_CALENDAR") {
        config.store.calendar = calendar;
    }
    if let Some(variant) = env_parse::<SchemaVariant>("SHIFTSYNC_SCHEMA")? {
        config.schedule.variant = variant;
    }
    if let Some(zone) = env_opt("SHIFTSYNC_TIMEZONE") {
        config.schedule.timezone = zone;
    }
    if let Some(algorithm) = env_parse::<TotpAlgorithm>("SHIFTSYNC_TOTP_ALGORITHM")? {
        config.portal.totp.algorithm = algorithm;
    }
    if let Some(endpoint) = env_opt("SHIFTSYNC_WEBDRIVER_URL") {
        config.webdriver.endpoint = endpoint;
    }
    config.webdriver.headless = env_bool("SHIFTSYNC_HEADLESS", config.webdriver.headless);
    if let Some(dir) = env_opt("SHIFTSYNC_STAGING_DIR") {
        config.paths.staging_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = env_opt("SHIFTSYNC_DIAGNOSTICS_DIR") {
        config.paths.diagnostics_dir = PathBuf::from(dir);
    }
    if let Ok(file) = std::env::var("SHIFTSYNC_LOG_FILE") {
        config.logging.file = (!file.trim().is_empty()).then(|| PathBuf::from(file));
    }
    if let Some(format) = env_parse::<LogFormat>("SHIFTSYNC_LOG_FORMAT")? {
        config.logging.format = format;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ShiftSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ShiftSyncError::config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            ShiftSyncError::config(
                "No config file found and required SHIFTSYNC_* variables are not set",
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ShiftSyncError::config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ShiftSyncError::config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ShiftSyncError::config(format!("Invalid JSON format: {e}"))),
        _ => Err(ShiftSyncError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.is_file())
}

/// Get required environment variable
///
/// # Errors
/// Returns `ShiftSyncError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ShiftSyncError::config(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env_opt(key)
        .map(|raw| raw.parse::<T>().map_err(|e| ShiftSyncError::config(format!("{key}: {e}"))))
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
