//! Schedule extraction from the live browser session

use std::sync::Arc;
use std::time::Duration;

use shiftsync_domain::{Locator, RawShift, Result, SchemaVariant, ScheduleConfig};
use tracing::{error, info, instrument};

use super::document::{scan_document, ScheduleScan};
use super::schema::{CompiledSelectors, SelectorSet};
use crate::browser::{BrowserSession, Diagnostics, Readiness, Waiter};

pub struct ScheduleExtractor {
    browser: Arc<dyn BrowserSession>,
    diagnostics: Diagnostics,
    waiter: Waiter,
    schedule_url: String,
    variant: SchemaVariant,
    container: Locator,
    selectors: CompiledSelectors,
    container_timeout: Duration,
    settle: Duration,
}

impl ScheduleExtractor {
    /// # Errors
    /// Returns `ShiftSyncError::Config` when a configured selector is invalid.
    pub fn new(
        browser: Arc<dyn BrowserSession>,
        diagnostics: Diagnostics,
        waiter: Waiter,
        schedule_url: impl Into<String>,
        schedule: &ScheduleConfig,
    ) -> Result<Self> {
        let set = SelectorSet::resolve(schedule.variant, &schedule.selectors);
        let selectors = set.compile()?;
        Ok(Self {
            browser,
            diagnostics,
            waiter,
            schedule_url: schedule_url.into(),
            variant: schedule.variant,
            container: Locator::css(set.container),
            selectors,
            container_timeout: schedule.container_timeout(),
            settle: schedule.settle_delay(),
        })
    }

    /// Navigate to the schedule and read every shift on it.
    ///
    /// A schedule container that never renders yields an empty list after
    /// the page source and a `timeout_error` screenshot are captured.
    ///
    /// # Errors
    /// Browser failures other than the container timeout.
    #[instrument(skip(self), fields(variant = %self.variant))]
    pub async fn extract(&self) -> Result<Vec<RawShift>> {
        info!(url = %self.schedule_url, "Starting to scrape the schedule");
        self.browser.navigate(&self.schedule_url).await?;
        tokio::time::sleep(self.settle).await;
        self.diagnostics.log_page_details().await;

        let wait = self
            .waiter
            .until_element(
                self.browser.as_ref(),
                &self.container,
                Readiness::Present,
                self.container_timeout,
            )
            .await;
        match wait {
            Ok(_) => {}
            Err(err) if err.is_timeout() => {
                error!(error = %err, "Timeout while waiting for schedule elements");
                self.diagnostics.capture("timeout_error").await;
                self.diagnostics.dump_page_source().await;
                return Ok(Vec::new());
            }
            Err(err) => {
                self.diagnostics.capture("scrape_error").await;
                return Err(err);
            }
        }

        let html = match self.browser.page_source().await {
            Ok(html) => html,
            Err(err) => {
                error!(error = %err, "Could not read schedule document");
                self.diagnostics.capture("scrape_error").await;
                return Err(err);
            }
        };

        let scan = scan_document(&html, &self.selectors, self.variant);
        self.report(&scan).await;
        Ok(scan.shifts)
    }

    async fn report(&self, scan: &ScheduleScan) {
        for day in &scan.failed_days {
            self.diagnostics.capture(&format!("error_scraping_shifts_{day}")).await;
        }
        info!(
            days = scan.days_seen,
            shifts = scan.shifts.len(),
            duplicates = scan.duplicates,
            skipped = scan.skipped,
            failed_days = scan.failed_days.len(),
            "Schedule scraped"
        );
    }
}
