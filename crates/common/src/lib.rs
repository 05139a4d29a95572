//! Domain-agnostic utilities shared across ShiftSync crates.
//!
//! Currently this is the fixed-backoff retry executor behind document
//! interaction.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod resilience;

pub use resilience::{
    RetryConfig, RetryConfigBuilder, RetryError, RetryExecutor, RetryOutcome, RetryResult,
};
