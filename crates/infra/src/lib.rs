//! # ShiftSync Infrastructure
//!
//! Adapters implementing the ports of `shiftsync-core`.
//!
//! This crate contains:
//! - The W3C WebDriver browser session
//! - Raw WebDAV and CalDAV calendar stores
//! - The TOTP one-time-code generator
//! - Filesystem artifact sink and staging area
//! - The shared HTTP client and configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `shiftsync-core`
//! - Contains all "impure" code (HTTP, filesystem, environment)

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod auth;
pub mod browser;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod http;
pub mod staging;
pub mod stores;

// Re-export commonly used items
pub use auth::{TotpError, TotpGenerator};
pub use browser::WebDriverSession;
pub use diagnostics::FsArtifactSink;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use staging::FsStaging;
pub use stores::{connect_store, CalDavStore, WebDavStore};
