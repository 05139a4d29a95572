//! Bounded polling waits on the rendered document

use std::time::Duration;

use shiftsync_domain::{Locator, Result, ShiftSyncError};
use tokio::time::Instant;
use tracing::trace;

use super::ports::{BrowserSession, ElementHandle};

/// What an element must satisfy before a wait returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Present,
    Visible,
    Clickable,
}

impl Readiness {
    fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }
}

/// Polls the browser at a fixed interval until a condition holds or the
/// timeout runs out.
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Wait until `locator` matches an element in the required state.
    ///
    /// # Errors
    /// `ShiftSyncError::Timeout` when the deadline passes; browser errors are
    /// returned as-is.
    pub async fn until_element(
        &self,
        browser: &dyn BrowserSession,
        locator: &Locator,
        readiness: Readiness,
        timeout: Duration,
    ) -> Result<ElementHandle> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = browser.find_element(locator).await? {
                if self.is_ready(browser, &element, readiness).await? {
                    return Ok(element);
                }
            }
            if Instant::now() >= deadline {
                return Err(ShiftSyncError::timeout(format!(
                    "{locator} not {} within {timeout:?}",
                    readiness.as_str()
                )));
            }
            trace!(%locator, "Element not ready, polling again");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Wait until the current location contains `fragment`.
    ///
    /// Returns the matching location.
    ///
    /// # Errors
    /// `ShiftSyncError::Timeout` when the deadline passes.
    pub async fn until_url_contains(
        &self,
        browser: &dyn BrowserSession,
        fragment: &str,
        timeout: Duration,
    ) -> Result<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let url = browser.current_url().await?;
            if url.contains(fragment) {
                return Ok(url);
            }
            if Instant::now() >= deadline {
                return Err(ShiftSyncError::timeout(format!(
                    "location did not reach {fragment} within {timeout:?} (at {url})"
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn is_ready(
        &self,
        browser: &dyn BrowserSession,
        element: &ElementHandle,
        readiness: Readiness,
    ) -> Result<bool> {
        if readiness == Readiness::Present {
            return Ok(true);
        }
        let state = browser.element_state(element).await?;
        Ok(match readiness {
            Readiness::Present => true,
            Readiness::Visible => state.displayed,
            Readiness::Clickable => state.displayed && state.enabled,
        })
    }
}
