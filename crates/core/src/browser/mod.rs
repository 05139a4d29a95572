//! Browser-facing building blocks: ports, waits, diagnostics and the
//! retrying interactor.

pub mod diagnostics;
pub mod interaction;
pub mod ports;
pub mod wait;

pub use diagnostics::Diagnostics;
pub use interaction::{Action, RetryingInteractor};
pub use ports::{ArtifactSink, BrowserSession, ElementHandle, ElementState};
pub use wait::{Readiness, Waiter};
