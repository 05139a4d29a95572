//! # ShiftSync Domain
//!
//! Business domain types for the schedule sync pipeline.
//!
//! This crate contains:
//! - Shift and calendar event types (RawShift, CalendarEvent, EventKey)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants and time-range parsing utilities
//!
//! ## Architecture
//! - No dependencies on other ShiftSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::time_range::{strip_annotations, TimeRange};
