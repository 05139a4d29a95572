//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;

use shiftsync_domain::{Locator, SchemaVariant, StoreKind, SummaryStyle, TotpAlgorithm};
use shiftsync_infra::config;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    path
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[portal]
login_url = "https://portal.example.com/login"
schedule_url = "https://portal.example.com/schedule"
username = "worker@example.com"
password = "hunter2"
totp_secret = "JBSWY3DPEHPK3PXP"

[portal.totp]
algorithm = "sha256"
digits = 8

[portal.login_form]
code_field = { by = "id", value = "otcInput" }

[schedule]
variant = "simple"
timezone = "America/Chicago"
container_timeout_secs = 60

[schedule.selectors]
container = "div.schedule"

[store]
kind = "caldav"
url = "https://cloud.example.com/remote.php/dav/"
username = "worker"
password = "secret"
calendar = "Shifts"

[paths]
staging_dir = "events"
retain_published = false
"#;

    let dir = TempDir::new().unwrap();
    let path = write(&dir, "shiftsync.toml", toml_content);

    let config = config::load_from_file(Some(path)).expect("Failed to load config from TOML file");

    assert_eq!(config.portal.totp.algorithm, TotpAlgorithm::Sha256);
    assert_eq!(config.portal.totp.digits, 8);
    assert_eq!(config.portal.login_form.code_field, Locator::id("otcInput"));
    assert_eq!(config.portal.login_form.password_field, Locator::name("passwd"));
    assert_eq!(config.schedule.variant, SchemaVariant::Simple);
    assert_eq!(config.schedule.summary_style(), SummaryStyle::Verbatim);
    assert_eq!(config.schedule.selectors.container.as_deref(), Some("div.schedule"));
    assert_eq!(config.schedule.container_timeout_secs, 60);
    assert_eq!(config.store.kind, StoreKind::Caldav);
    assert_eq!(config.store.calendar, "Shifts");
    assert_eq!(config.paths.staging_dir, Some(PathBuf::from("events")));
    assert!(!config.paths.retain_published);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_from_json_file_with_defaults() {
    let json_content = r#"{
        "portal": {
            "login_url": "https://portal.example.com/login",
            "schedule_url": "https://portal.example.com/schedule",
            "username": "worker@example.com",
            "password": "hunter2",
            "totp_secret": "JBSWY3DPEHPK3PXP"
        },
        "schedule": {},
        "store": {
            "url": "https://dav.example.com/worker/personal/",
            "username": "worker",
            "password": "secret"
        }
    }"#;

    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.json", json_content);

    let config = config::load_from_file(Some(path)).expect("Failed to load config from JSON file");

    assert_eq!(config.schedule.variant, SchemaVariant::Rich);
    assert_eq!(config.schedule.timezone, "US/Eastern");
    assert_eq!(config.store.kind, StoreKind::Webdav);
    assert_eq!(config.store.calendar, "personal");
    assert_eq!(config.interaction.attempts, 5);
    assert_eq!(config.webdriver.endpoint, "http://localhost:9515");
    assert!(config.webdriver.headless);
    assert_eq!(config.logging.file, Some(PathBuf::from("schedule_sync.log")));
}

#[test]
fn test_missing_required_section_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "shiftsync.toml", "[schedule]\nvariant = \"rich\"\n");

    let err = config::load_from_file(Some(path)).unwrap_err();

    assert!(err.to_string().contains("Invalid TOML format"));
}

#[test]
fn test_malformed_json_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "shiftsync.json", "{ \"portal\": ");

    let err = config::load_from_file(Some(path)).unwrap_err();

    assert!(err.to_string().contains("Invalid JSON format"));
}
