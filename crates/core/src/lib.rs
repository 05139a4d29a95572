//! # ShiftSync Core
//!
//! Business logic of the schedule sync pipeline. No browser, HTTP or
//! filesystem code lives here; every external system is reached through a
//! port trait implemented in `shiftsync-infra`.
//!
//! ## Stages
//! - [`session`]: log in through the portal's multi-factor forms
//! - [`extract`]: read raw shifts from the rendered schedule
//! - [`events`]: build zoned calendar events and encode them as iCalendar
//! - [`sync`]: index the remote calendar, reconcile, publish
//! - [`pipeline`]: run the stages in order

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod browser;
pub mod events;
pub mod extract;
pub mod pipeline;
pub mod session;
pub mod sync;

pub use browser::{
    Action, ArtifactSink, BrowserSession, Diagnostics, ElementHandle, ElementState, Readiness,
    RetryingInteractor, Waiter,
};
pub use events::{decode_events, encode_event, DecodedEvent, EventNormalizer, NormalizedBatch};
pub use extract::{scan_document, ScheduleExtractor, ScheduleScan, SelectorSet};
pub use pipeline::{PipelineAdapters, SyncPipeline, SyncReport};
pub use session::{Arrival, OneTimeCodeSource, SessionAcquirer, SessionState};
pub use sync::{
    CalendarStore, CollectionInfo, PendingEvent, PublishReport, Publisher, ReconciledBatch,
    Reconciler, RemoteEntry, RemoteEventIndex, RemoteResource, StagingArea,
};
