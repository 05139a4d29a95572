//! Port interfaces for session acquisition

use shiftsync_domain::Result;

/// Source of time-based one-time codes.
///
/// Codes are time-windowed, so callers ask for one at the moment they type
/// it and never cache the result.
pub trait OneTimeCodeSource: Send + Sync {
    fn current_code(&self) -> Result<String>;
}
