//! One end-to-end sync run: log in, scrape, normalize, reconcile, publish

use std::sync::Arc;

use shiftsync_domain::{Config, Result};
use tracing::{error, info, instrument, warn};

use crate::browser::{ArtifactSink, BrowserSession, Diagnostics, Waiter};
use crate::events::EventNormalizer;
use crate::extract::ScheduleExtractor;
use crate::session::{Arrival, OneTimeCodeSource, SessionAcquirer};
use crate::sync::{CalendarStore, Publisher, Reconciler, RemoteEventIndex, StagingArea};

/// Adapters the pipeline runs against.
pub struct PipelineAdapters {
    pub browser: Arc<dyn BrowserSession>,
    pub store: Arc<dyn CalendarStore>,
    pub codes: Arc<dyn OneTimeCodeSource>,
    pub artifacts: Arc<dyn ArtifactSink>,
    pub staging: Option<Arc<dyn StagingArea>>,
}

/// Counters for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub arrival: Option<Arrival>,
    pub extracted: usize,
    pub normalized: usize,
    pub skipped: usize,
    pub remote_events: usize,
    pub remote_omitted: usize,
    pub already_present: usize,
    pub repeated: usize,
    pub published: usize,
    pub failed: usize,
}

/// Sequential scrape → normalize → reconcile → publish pipeline.
pub struct SyncPipeline {
    browser: Arc<dyn BrowserSession>,
    store: Arc<dyn CalendarStore>,
    session: SessionAcquirer,
    extractor: ScheduleExtractor,
    normalizer: EventNormalizer,
    reconciler: Reconciler,
    publisher: Publisher,
    calendar_name: String,
    prodid: String,
}

impl SyncPipeline {
    /// # Errors
    /// Returns `ShiftSyncError::Config` when selectors, time zone or retry
    /// policy are unusable.
    pub fn new(config: &Config, adapters: PipelineAdapters) -> Result<Self> {
        let PipelineAdapters { browser, store, codes, artifacts, staging } = adapters;
        let diagnostics = Diagnostics::new(Arc::clone(&browser), artifacts);

        let session = SessionAcquirer::new(
            Arc::clone(&browser),
            diagnostics.clone(),
            codes,
            &config.portal,
            &config.interaction,
        )?;
        let extractor = ScheduleExtractor::new(
            Arc::clone(&browser),
            diagnostics,
            Waiter::new(config.interaction.poll_interval()),
            config.portal.schedule_url.clone(),
            &config.schedule,
        )?;
        let normalizer = EventNormalizer::from_config(&config.schedule, &config.events)?;
        let reconciler = Reconciler::new(staging.clone());
        let publisher =
            Publisher::new(Arc::clone(&store), staging, config.paths.retain_published);

        Ok(Self {
            browser,
            store,
            session,
            extractor,
            normalizer,
            reconciler,
            publisher,
            calendar_name: config.store.calendar.clone(),
            prodid: config.events.prodid.clone(),
        })
    }

    /// Run once. The browser session is released whatever the outcome.
    ///
    /// # Errors
    /// Fatal failures: login, extraction, calendar lookup or remote index
    /// fetch. Single-shift, single-event and single-upload failures are
    /// counted in the report instead.
    #[instrument(skip(self), fields(store = self.store.name(), calendar = %self.calendar_name))]
    pub async fn run(&self) -> Result<SyncReport> {
        let outcome = self.execute().await;

        if let Err(err) = self.browser.quit().await {
            warn!(error = %err, "Could not close browser session");
        }

        match &outcome {
            Ok(report) => info!(
                extracted = report.extracted,
                normalized = report.normalized,
                skipped = report.skipped,
                remote_events = report.remote_events,
                already_present = report.already_present,
                published = report.published,
                failed = report.failed,
                "Sync run complete"
            ),
            Err(err) if err.is_fatal() => {
                error!(error = %err, kind = err.label(), "Sync run aborted");
            }
            Err(err) => warn!(error = %err, kind = err.label(), "Sync run stopped early"),
        }
        outcome
    }

    async fn execute(&self) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        let arrival = self.session.acquire().await?;
        if !arrival.is_verified() {
            warn!(arrival = ?arrival, "Continuing to extraction without a verified arrival");
        }
        report.arrival = Some(arrival);

        let shifts = self.extractor.extract().await?;
        report.extracted = shifts.len();

        let normalized = self.normalizer.normalize_all(shifts);
        report.normalized = normalized.events.len();
        report.skipped = normalized.skipped;

        // Nothing is staged until the target calendar is known to be readable.
        let zone = self.normalizer.zone();
        let index = RemoteEventIndex::fetch(self.store.as_ref(), &self.calendar_name, zone).await?;
        report.remote_events = index.len();
        report.remote_omitted = index.omitted();

        let candidates = self.reconciler.prepare(normalized.events, &self.prodid).await;

        let batch = self.reconciler.reconcile(candidates, &index).await;
        report.already_present = batch.already_present;
        report.repeated = batch.repeated;

        let published = self.publisher.publish_all(index.collection(), batch).await;
        report.published = published.published.len();
        report.failed = published.failed.len();
        Ok(report)
    }
}
