//! In-memory calendar store

use std::sync::Mutex;

use async_trait::async_trait;
use shiftsync_core::{CalendarStore, CollectionInfo, RemoteResource};
use shiftsync_domain::{Result as DomainResult, ShiftSyncError};

/// Calendar store backed by a list of collections in memory.
///
/// Published events become resources of their collection, so a second run
/// against the same store sees the first run's uploads.
pub struct InMemoryStore {
    collections: Vec<CollectionInfo>,
    state: Mutex<StoreState>,
    reject_containing: Option<String>,
    unreachable: bool,
}

#[derive(Default)]
struct StoreState {
    resources: Vec<(String, RemoteResource)>,
    published: Vec<String>,
    fetches: usize,
}

impl InMemoryStore {
    pub fn with_calendars(names: &[&str]) -> Self {
        let collections = names
            .iter()
            .map(|name| {
                CollectionInfo::new(*name, format!("https://dav.test/{}/", name.to_lowercase()))
            })
            .collect();
        Self {
            collections,
            state: Mutex::new(StoreState::default()),
            reject_containing: None,
            unreachable: false,
        }
    }

    /// Seed `collection` with a raw iCalendar resource.
    pub fn with_resource(self, collection: &str, href: &str, ics: &str) -> Self {
        self.state.lock().unwrap().resources.push((
            collection.to_string(),
            RemoteResource { href: href.to_string(), ics: ics.to_string() },
        ));
        self
    }

    /// Uploads whose body contains `needle` fail with a transport error.
    pub fn rejecting(mut self, needle: &str) -> Self {
        self.reject_containing = Some(needle.to_string());
        self
    }

    /// Every call fails as if the server were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// UIDs uploaded so far, in order.
    pub fn published(&self) -> Vec<String> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn fetches(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    fn check_reachable(&self) -> DomainResult<()> {
        if self.unreachable {
            return Err(ShiftSyncError::transport("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_collections(&self) -> DomainResult<Vec<CollectionInfo>> {
        self.check_reachable()?;
        Ok(self.collections.clone())
    }

    async fn fetch_events(&self, collection: &CollectionInfo) -> DomainResult<Vec<RemoteResource>> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        Ok(state
            .resources
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(&collection.name))
            .map(|(_, resource)| resource.clone())
            .collect())
    }

    async fn publish(&self, collection: &CollectionInfo, uid: &str, ics: &str) -> DomainResult<()> {
        self.check_reachable()?;
        if self.reject_containing.as_deref().is_some_and(|needle| ics.contains(needle)) {
            return Err(ShiftSyncError::transport(format!("PUT {uid}.ics returned 507")));
        }
        let mut state = self.state.lock().unwrap();
        state.published.push(uid.to_string());
        state.resources.push((
            collection.name.clone(),
            RemoteResource { href: format!("{}{uid}.ics", collection.href), ics: ics.to_string() },
        ));
        Ok(())
    }
}
