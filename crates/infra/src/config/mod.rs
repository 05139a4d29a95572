//! Configuration loading
//!
//! Builds the one immutable [`shiftsync_domain::Config`] value of a run from
//! environment variables or a config file.

pub mod loader;

pub use loader::{find_config_file, load, load_from_env, load_from_file, CONFIG_PATH_VAR};
