//! Reconciliation against the remote calendar store and publishing

pub mod index;
pub mod ports;
pub mod publisher;
pub mod reconciler;

pub use index::{RemoteEntry, RemoteEventIndex};
pub use ports::{CalendarStore, CollectionInfo, RemoteResource, StagingArea};
pub use publisher::{PublishReport, Publisher};
pub use reconciler::{PendingEvent, ReconciledBatch, Reconciler};
