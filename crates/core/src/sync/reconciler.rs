//! Additive diff between freshly normalized events and the remote index

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use shiftsync_domain::{CalendarEvent, EventKey};
use tracing::{debug, info, instrument, warn};

use super::index::RemoteEventIndex;
use super::ports::StagingArea;
use crate::events::encode_event;

/// An encoded event waiting to be published.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    pub event: CalendarEvent,
    pub ics: String,
    /// Staged file, when a staging area is configured.
    pub staged: Option<PathBuf>,
}

impl PendingEvent {
    pub fn encode(event: CalendarEvent, prodid: &str) -> Self {
        let ics = encode_event(&event, prodid);
        Self { event, ics, staged: None }
    }

    pub fn key(&self) -> EventKey {
        self.event.key()
    }
}

/// Events whose key the remote store does not know yet.
#[derive(Debug, Default)]
pub struct ReconciledBatch {
    pub pending: Vec<PendingEvent>,
    /// Events dropped because the store already has them.
    pub already_present: usize,
    /// Events dropped because an earlier event in the same batch had their key.
    pub repeated: usize,
}

impl ReconciledBatch {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Splits a batch into events to publish and events to drop.
///
/// Nothing is ever removed from the remote store; only local staged files
/// of dropped events are deleted.
#[derive(Clone, Default)]
pub struct Reconciler {
    staging: Option<Arc<dyn StagingArea>>,
}

impl Reconciler {
    pub fn new(staging: Option<Arc<dyn StagingArea>>) -> Self {
        Self { staging }
    }

    /// Encode every event and, with staging enabled, write its file.
    ///
    /// A file that cannot be written leaves the event in memory only.
    pub async fn prepare(&self, events: Vec<CalendarEvent>, prodid: &str) -> Vec<PendingEvent> {
        let mut pending = Vec::with_capacity(events.len());
        for event in events {
            let mut item = PendingEvent::encode(event, prodid);
            if let Some(staging) = &self.staging {
                match staging.stage(&item.event, &item.ics).await {
                    Ok(path) => {
                        debug!(uid = %item.event.uid, path = %path.display(), "Event staged");
                        item.staged = Some(path);
                    }
                    Err(err) => warn!(uid = %item.event.uid, error = %err, "Could not stage event"),
                }
            }
            pending.push(item);
        }
        pending
    }

    /// Keep only events whose key is absent from `index`.
    #[instrument(skip_all, fields(candidates = candidates.len(), remote = index.len()))]
    pub async fn reconcile(
        &self,
        candidates: Vec<PendingEvent>,
        index: &RemoteEventIndex,
    ) -> ReconciledBatch {
        let mut batch = ReconciledBatch::default();
        let mut seen = HashSet::new();

        for item in candidates {
            let key = item.key();
            if index.contains(&key) {
                info!(key = %key, "Event already exists on the store, skipping");
                batch.already_present += 1;
                self.discard(&item).await;
            } else if !seen.insert(key.clone()) {
                info!(key = %key, "Event repeated within this run, skipping");
                batch.repeated += 1;
                self.discard(&item).await;
            } else {
                debug!(key = %key, uid = %item.event.uid, "Event queued for publishing");
                batch.pending.push(item);
            }
        }

        info!(
            pending = batch.pending.len(),
            already_present = batch.already_present,
            repeated = batch.repeated,
            "Reconciliation complete"
        );
        batch
    }

    async fn discard(&self, item: &PendingEvent) {
        let (Some(staging), Some(path)) = (&self.staging, &item.staged) else {
            return;
        };
        match staging.discard(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed staged file for duplicate event"),
            Err(err) => warn!(path = %path.display(), error = %err, "Could not remove staged file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::US::Eastern;

    use super::*;
    use crate::sync::index::RemoteEntry;
    use crate::sync::ports::CollectionInfo;

    fn event(uid: &str, day: u32, summary: &str) -> CalendarEvent {
        CalendarEvent::new(
            uid,
            Eastern.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap(),
            Eastern.with_ymd_and_hms(2025, 1, day, 17, 0, 0).unwrap(),
            summary,
            Utc::now(),
        )
        .unwrap()
    }

    fn index_with(events: &[CalendarEvent]) -> RemoteEventIndex {
        let mut index = RemoteEventIndex::empty(CollectionInfo::new("Personal", "https://dav/p/"));
        for e in events {
            let entry = RemoteEntry {
                href: e.file_name(),
                uid: Some(e.uid.clone()),
                source: Arc::from(""),
            };
            index.insert(e.key(), entry);
        }
        index
    }

    #[tokio::test]
    async fn present_keys_are_dropped_regardless_of_uid() {
        let reconciler = Reconciler::default();
        let remote = index_with(&[event("old@x", 6, "Front Desk")]);
        let scraped = vec![event("new@x", 6, "Front Desk"), event("new2@x", 7, "Front Desk")];
        let candidates = reconciler.prepare(scraped, "-//T//EN").await;

        let batch = reconciler.reconcile(candidates, &remote).await;
        assert_eq!(batch.already_present, 1);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.pending[0].event.uid, "new2@x");
    }

    #[tokio::test]
    async fn second_run_against_published_events_is_empty() {
        let reconciler = Reconciler::default();
        let first_run = vec![event("a@x", 6, "Front Desk"), event("b@x", 7, "Stockroom")];
        let published = reconciler
            .reconcile(reconciler.prepare(first_run.clone(), "-//T//EN").await, &index_with(&[]))
            .await;
        assert_eq!(published.len(), 2);

        let remote = index_with(&first_run);
        let again = vec![event("c@x", 6, "Front Desk"), event("d@x", 7, "Stockroom")];
        let candidates = reconciler.prepare(again, "-//T//EN").await;
        let batch = reconciler.reconcile(candidates, &remote).await;
        assert!(batch.is_empty());
        assert_eq!(batch.already_present, 2);
    }

    #[tokio::test]
    async fn repeated_keys_in_one_batch_publish_once() {
        let reconciler = Reconciler::default();
        let candidates = reconciler
            .prepare(vec![event("a@x", 6, "Front Desk"), event("b@x", 6, "Front Desk")], "-//T//EN")
            .await;
        let batch = reconciler.reconcile(candidates, &index_with(&[])).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.repeated, 1);
    }

    #[tokio::test]
    async fn different_summary_is_a_different_event() {
        let reconciler = Reconciler::default();
        let remote = index_with(&[event("old@x", 6, "Front Desk")]);
        let candidates = reconciler.prepare(vec![event("n@x", 6, "Stockroom")], "-//T//EN").await;
        assert_eq!(reconciler.reconcile(candidates, &remote).await.len(), 1);
    }
}
