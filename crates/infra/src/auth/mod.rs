//! Second-factor code generation

pub mod totp;

pub use totp::{TotpError, TotpGenerator};
