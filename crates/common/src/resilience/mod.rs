//! Resilience patterns for fault tolerance
//!
//! Generic over the error type; document interaction is the caller.

pub mod retry;

pub use retry::{
    RetryConfig, RetryConfigBuilder, RetryError, RetryExecutor, RetryOutcome, RetryResult,
};
