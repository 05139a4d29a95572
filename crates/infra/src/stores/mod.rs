//! Remote calendar store adapters

pub mod caldav;
mod dav;
pub mod webdav;

use std::sync::Arc;

use shiftsync_core::CalendarStore;
use shiftsync_domain::{Result, StoreConfig, StoreKind};

pub use caldav::CalDavStore;
pub use webdav::WebDavStore;

/// Build the adapter selected by `store.kind`.
///
/// # Errors
/// `Config` when the store URL is invalid or the HTTP client cannot be built.
pub fn connect_store(config: &StoreConfig) -> Result<Arc<dyn CalendarStore>> {
    let store: Arc<dyn CalendarStore> = match config.kind {
        StoreKind::Webdav => Arc::new(WebDavStore::from_config(config)?),
        StoreKind::Caldav => Arc::new(CalDavStore::from_config(config)?),
    };
    tracing::info!(store = store.name(), url = %config.url, "Calendar store configured");
    Ok(store)
}
