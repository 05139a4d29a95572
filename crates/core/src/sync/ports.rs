//! Port interfaces for the remote calendar store and local staging

use std::path::PathBuf;

use async_trait::async_trait;
use shiftsync_domain::{CalendarEvent, Result};

/// A calendar collection offered by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Human-readable display name, matched case-insensitively.
    pub name: String,
    /// Absolute URL of the collection.
    pub href: String,
}

impl CollectionInfo {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self { name: name.into(), href: href.into() }
    }
}

/// One stored resource and its raw iCalendar body.
///
/// A body may hold several `VEVENT`s when the store serves a whole
/// calendar at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    pub href: String,
    pub ics: String,
}

/// Trait for the remote system of record
///
/// Implementations never delete or modify stored events.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Short adapter name for logs, e.g. `"webdav"`.
    fn name(&self) -> &'static str;

    /// Collections visible to the configured account
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Every resource currently stored in `collection`
    async fn fetch_events(&self, collection: &CollectionInfo) -> Result<Vec<RemoteResource>>;

    /// Create a new member of `collection` holding `ics`
    async fn publish(&self, collection: &CollectionInfo, uid: &str, ics: &str) -> Result<()>;
}

/// Trait for the on-disk unit of work between reconciliation and publishing
#[async_trait]
pub trait StagingArea: Send + Sync {
    /// Write `ics` as the file for `event` and return its path.
    async fn stage(&self, event: &CalendarEvent, ics: &str) -> Result<PathBuf>;

    /// Remove a previously staged file. Missing files are not an error.
    async fn discard(&self, path: &std::path::Path) -> Result<()>;
}
