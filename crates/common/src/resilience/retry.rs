//! Bounded retry with a fixed pause between attempts
//!
//! [`RetryExecutor`] runs an async operation until it succeeds or the attempt
//! budget is spent. Every failure is retried; the operation itself decides
//! what counts as a failure.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("All retry attempts exhausted after {attempts} tries")]
    AttemptsExhausted { attempts: u32, last_error: E },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up, when known.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::AttemptsExhausted { attempts, .. } => Some(*attempts),
            Self::InvalidConfiguration { .. } => None,
        }
    }

    /// The last error returned by the operation, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { last_error, .. } => Some(last_error),
            Self::InvalidConfiguration { .. } => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
    /// Time spent sleeping between attempts.
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Pause after each failed attempt that is followed by another one
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 5, backoff: Duration::from_secs(10) }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns `RetryError::InvalidConfiguration` for zero attempts.
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = delay;
        self
    }

    /// # Errors
    /// See [`RetryConfig::validate`].
    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic and return outcome statistics.
    ///
    /// The operation receives the one-based attempt number.
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        E: fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut total_delay = Duration::ZERO;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(attempt, max_attempts, "Executing operation");

            let error = match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retries");
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt, total_delay };
                }
                Err(error) => error,
            };

            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %error, "All retry attempts exhausted");
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted {
                        attempts: attempt,
                        last_error: error,
                    }),
                    attempts: attempt,
                    total_delay,
                };
            }

            let delay = self.config.backoff;
            warn!(attempt, error = %error, ?delay, "Operation failed, retrying");
            tokio::time::sleep(delay).await;
            total_delay += delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn fixed(attempts: u32, delay: Duration) -> RetryConfig {
        RetryConfig::builder().max_attempts(attempts).fixed_backoff(delay).build().unwrap()
    }

    #[test]
    fn test_builder_sets_fixed_backoff() {
        let config = fixed(3, Duration::from_millis(250));
        assert_eq!(config, RetryConfig { max_attempts: 3, backoff: Duration::from_millis(250) });
    }

    #[test]
    fn test_builder_rejects_zero_attempts() {
        let result = RetryConfig::builder().max_attempts(0).build();
        assert!(matches!(result, Err(RetryError::InvalidConfiguration { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(fixed(5, Duration::from_secs(10)));

        let counter = calls.clone();
        let outcome = executor
            .execute_with_outcome(|_| {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("not yet")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.total_delay, Duration::from_secs(20));
        assert_eq!(outcome.into_result().unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempts_and_last_error() {
        let executor = RetryExecutor::new(fixed(5, Duration::from_secs(10)));

        let outcome = executor
            .execute_with_outcome(|attempt| async move {
                Err::<(), String>(format!("failure {attempt}"))
            })
            .await;

        assert_eq!(outcome.attempts, 5);
        assert_eq!(outcome.total_delay, Duration::from_secs(40));
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.attempts(), Some(5));
        assert_eq!(err.into_inner().as_deref(), Some("failure 5"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_sleeps() {
        let executor = RetryExecutor::new(fixed(1, Duration::from_secs(10)));
        let outcome = executor.execute_with_outcome(|_| async { Err::<(), _>("down") }).await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.total_delay, Duration::ZERO);
    }
}
