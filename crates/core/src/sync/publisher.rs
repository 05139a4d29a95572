//! Best-effort upload of a reconciled batch

use std::sync::Arc;

use shiftsync_domain::Result;
use tracing::{debug, error, info, instrument, warn};

use super::ports::{CalendarStore, CollectionInfo, StagingArea};
use super::reconciler::{PendingEvent, ReconciledBatch};

/// Outcome of publishing one batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// UIDs created on the store.
    pub published: Vec<String>,
    /// UIDs that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Publisher {
    store: Arc<dyn CalendarStore>,
    staging: Option<Arc<dyn StagingArea>>,
    retain_published: bool,
}

impl Publisher {
    pub fn new(
        store: Arc<dyn CalendarStore>,
        staging: Option<Arc<dyn StagingArea>>,
        retain_published: bool,
    ) -> Self {
        Self { store, staging, retain_published }
    }

    /// Upload one event.
    ///
    /// # Errors
    /// The store's error for this event.
    pub async fn publish(&self, collection: &CollectionInfo, item: &PendingEvent) -> Result<()> {
        self.store.publish(collection, &item.event.uid, &item.ics).await?;
        info!(uid = %item.event.uid, summary = %item.event.summary, "Event published");

        if !self.retain_published {
            if let (Some(staging), Some(path)) = (&self.staging, &item.staged) {
                if let Err(err) = staging.discard(path).await {
                    warn!(path = %path.display(), error = %err, "Could not remove published file");
                }
            }
        }
        Ok(())
    }

    /// Upload every event in `batch`, one at a time.
    ///
    /// A failed upload is logged and the remaining events are still sent.
    #[instrument(skip_all, fields(calendar = %collection.name, events = batch.len()))]
    pub async fn publish_all(
        &self,
        collection: &CollectionInfo,
        batch: ReconciledBatch,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        if batch.is_empty() {
            info!("Nothing new to publish");
            return report;
        }

        for item in &batch.pending {
            match self.publish(collection, item).await {
                Ok(()) => report.published.push(item.event.uid.clone()),
                Err(err) => {
                    error!(uid = %item.event.uid, error = %err, "Failed to publish event");
                    report.failed.push((item.event.uid.clone(), err.to_string()));
                }
            }
        }

        debug!(
            published = report.published.len(),
            failed = report.failed.len(),
            "Publish pass done"
        );
        report
    }
}
