//! Snapshot of the events already present in the target collection

use std::collections::HashMap;
use std::sync::Arc;

use chrono_tz::Tz;
use shiftsync_domain::{EventKey, Result, ShiftSyncError};
use tracing::{debug, info, instrument, warn};

use super::ports::{CalendarStore, CollectionInfo};
use crate::events::decode_events;

/// Where an indexed event lives remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub href: String,
    pub uid: Option<String>,
    /// Raw body of the resource the event was read from.
    pub source: Arc<str>,
}

/// Lookup of remote events by [`EventKey`], rebuilt on every run.
#[derive(Debug, Clone)]
pub struct RemoteEventIndex {
    collection: CollectionInfo,
    entries: HashMap<EventKey, RemoteEntry>,
    omitted: usize,
}

impl RemoteEventIndex {
    /// Locate `calendar_name` on the store and index every event in it.
    ///
    /// Unreadable remote events are logged and left out of the index.
    ///
    /// # Errors
    /// `CalendarNotFound` when no collection carries the name, or the store's
    /// own error when listing or fetching fails. Both are fatal: without a
    /// complete baseline every local event would look new.
    #[instrument(skip(store, zone), fields(store = store.name()))]
    pub async fn fetch(store: &dyn CalendarStore, calendar_name: &str, zone: Tz) -> Result<Self> {
        let collections = store.list_collections().await?;
        let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
        info!(available = ?names, "Calendars found on store");

        let wanted = calendar_name.trim();
        let collection = collections
            .into_iter()
            .find(|c| c.name.trim().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ShiftSyncError::calendar_not_found(calendar_name))?;
        info!(calendar = %collection.name, href = %collection.href, "Target calendar selected");

        let resources = store.fetch_events(&collection).await?;
        let mut index = Self::empty(collection);
        for resource in resources {
            let source: Arc<str> = Arc::from(resource.ics.as_str());
            for decoded in decode_events(&resource.ics, zone) {
                match decoded {
                    Ok(event) => {
                        debug!(key = %event.key, href = %resource.href, "Indexed remote event");
                        index.entries.insert(
                            event.key,
                            RemoteEntry {
                                href: resource.href.clone(),
                                uid: event.uid,
                                source: Arc::clone(&source),
                            },
                        );
                    }
                    Err(err) => {
                        warn!(
                            href = %resource.href,
                            error = %err,
                            "Skipping unreadable remote event"
                        );
                        index.omitted += 1;
                    }
                }
            }
        }

        info!(events = index.len(), omitted = index.omitted, "Remote index built");
        Ok(index)
    }

    pub fn empty(collection: CollectionInfo) -> Self {
        Self { collection, entries: HashMap::new(), omitted: 0 }
    }

    /// Record `key` as present.
    pub fn insert(&mut self, key: EventKey, entry: RemoteEntry) {
        self.entries.insert(key, entry);
    }

    pub fn contains(&self, key: &EventKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &EventKey) -> Option<&RemoteEntry> {
        self.entries.get(key)
    }

    pub fn collection(&self) -> &CollectionInfo {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remote events that could not be read.
    pub fn omitted(&self) -> usize {
        self.omitted
    }
}
