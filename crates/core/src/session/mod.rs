//! Authenticated session acquisition

pub mod acquirer;
pub mod ports;

pub use acquirer::{Arrival, LoginCredentials, SessionAcquirer, SessionState};
pub use ports::OneTimeCodeSource;
