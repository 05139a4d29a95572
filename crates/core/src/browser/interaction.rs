//! Bounded-retry interaction with document elements

use std::sync::Arc;
use std::time::Duration;

use shiftsync_common::{RetryConfig, RetryExecutor};
use shiftsync_domain::{InteractionConfig, Locator, Result, ShiftSyncError};
use tracing::{error, info};

use super::diagnostics::Diagnostics;
use super::ports::BrowserSession;
use super::wait::{Readiness, Waiter};
use crate::session::ports::OneTimeCodeSource;

/// What to do with the element once it is interactable.
#[derive(Clone, Copy)]
pub enum Action<'a> {
    Click,
    Type(&'a str),
    /// Type a one-time code generated at the moment of the attempt.
    TypeOneTimeCode(&'a dyn OneTimeCodeSource),
}

impl Action<'_> {
    fn readiness(&self) -> Readiness {
        match self {
            Self::Click => Readiness::Clickable,
            Self::Type(_) | Self::TypeOneTimeCode(_) => Readiness::Visible,
        }
    }
}

/// Runs one element interaction with a fixed attempt budget.
///
/// Before each attempt the element must become interactable within the wait
/// timeout. Failed attempts capture diagnostics and sleep for the backoff
/// interval before the next try.
pub struct RetryingInteractor {
    browser: Arc<dyn BrowserSession>,
    diagnostics: Diagnostics,
    waiter: Waiter,
    executor: RetryExecutor,
    wait_timeout: Duration,
}

impl RetryingInteractor {
    /// # Errors
    /// Returns `ShiftSyncError::Config` when the attempt budget is zero.
    pub fn new(
        browser: Arc<dyn BrowserSession>,
        diagnostics: Diagnostics,
        policy: &InteractionConfig,
    ) -> Result<Self> {
        let config = RetryConfig::builder()
            .max_attempts(policy.attempts)
            .fixed_backoff(policy.backoff())
            .build()
            .map_err(|e| ShiftSyncError::config(e.to_string()))?;

        Ok(Self {
            browser,
            diagnostics,
            waiter: Waiter::new(policy.poll_interval()),
            executor: RetryExecutor::new(config),
            wait_timeout: policy.wait_timeout(),
        })
    }

    pub async fn click(&self, locator: &Locator) -> Result<()> {
        self.perform(locator, Action::Click).await
    }

    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        self.perform(locator, Action::Type(text)).await
    }

    /// Perform `action` on `locator`, retrying on any failure.
    ///
    /// # Errors
    /// `ShiftSyncError::InteractionExhausted` carrying the locator and the
    /// number of attempts once the budget is spent.
    pub async fn perform(&self, locator: &Locator, action: Action<'_>) -> Result<()> {
        let max_attempts = self.executor.config().max_attempts;
        let outcome = self
            .executor
            .execute_with_outcome(|attempt| async move {
                info!(%locator, attempt, max_attempts, "Attempting interaction");
                match self.attempt(locator, action).await {
                    Ok(()) => {
                        info!(%locator, "Interaction succeeded");
                        Ok(())
                    }
                    Err(err) => {
                        self.diagnostics.capture(&format!("interaction_failure_{attempt}")).await;
                        Err(err)
                    }
                }
            })
            .await;

        let attempts = outcome.attempts;
        outcome.into_result().map_err(|retry_error| {
            let attempts = retry_error.attempts().unwrap_or(attempts);
            let last = retry_error.into_inner().map(|e| e.to_string()).unwrap_or_default();
            error!(%locator, attempts, last_error = %last, "Interaction exhausted");
            ShiftSyncError::InteractionExhausted { locator: locator.to_string(), attempts }
        })
    }

    async fn attempt(&self, locator: &Locator, action: Action<'_>) -> Result<()> {
        let element = self
            .waiter
            .until_element(self.browser.as_ref(), locator, action.readiness(), self.wait_timeout)
            .await?;

        match action {
            Action::Click => self.browser.click(&element).await,
            Action::Type(text) => self.browser.send_keys(&element, text).await,
            Action::TypeOneTimeCode(source) => {
                let code = source.current_code()?;
                self.browser.send_keys(&element, &code).await
            }
        }
    }
}
