//! Time-based one-time codes (RFC 6238)

use chrono::Utc;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use shiftsync_core::OneTimeCodeSource;
use shiftsync_domain::{Result, ShiftSyncError, TotpAlgorithm, TotpConfig};
use thiserror::Error;
use tracing::debug;

type HmacSha1 = Hmac<sha1::Sha1>;
type HmacSha256 = Hmac<sha2::Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotpError {
    #[error("one-time-code secret is empty")]
    EmptySecret,

    #[error("one-time-code secret is not valid base32: {0}")]
    InvalidSecret(String),

    #[error("unsupported code length {0}; expected 6 to 8 digits")]
    InvalidDigits(u32),

    #[error("time step must be at least one second")]
    InvalidStep,

    #[error("system clock is before the Unix epoch")]
    ClockBeforeEpoch,
}

impl From<TotpError> for ShiftSyncError {
    fn from(value: TotpError) -> Self {
        match value {
            TotpError::ClockBeforeEpoch => ShiftSyncError::internal(value.to_string()),
            other => ShiftSyncError::config(other.to_string()),
        }
    }
}

/// Generates codes from a shared base32 secret.
///
/// Each call reads the clock, so a code is never reused across retries.
pub struct TotpGenerator {
    key: Vec<u8>,
    algorithm: TotpAlgorithm,
    digits: u32,
    step_secs: u64,
}

impl std::fmt::Debug for TotpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TotpGenerator")
            .field("key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("digits", &self.digits)
            .field("step_secs", &self.step_secs)
            .finish()
    }
}

impl TotpGenerator {
    /// Decode `secret` and validate the code parameters.
    ///
    /// Spaces, hyphens, lowercase letters and `=` padding in the secret are
    /// accepted.
    ///
    /// # Errors
    /// A [`TotpError`] describing the unusable secret or parameter.
    pub fn new(secret: &str, config: &TotpConfig) -> std::result::Result<Self, TotpError> {
        let cleaned: String = secret
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '=')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if cleaned.is_empty() {
            return Err(TotpError::EmptySecret);
        }
        let key = BASE32_NOPAD
            .decode(cleaned.as_bytes())
            .map_err(|err| TotpError::InvalidSecret(err.to_string()))?;

        if !(6..=8).contains(&config.digits) {
            return Err(TotpError::InvalidDigits(config.digits));
        }
        if config.step_secs == 0 {
            return Err(TotpError::InvalidStep);
        }

        Ok(Self {
            key,
            algorithm: config.algorithm,
            digits: config.digits,
            step_secs: config.step_secs,
        })
    }

    /// Code valid at `unix_secs`.
    pub fn code_at(&self, unix_secs: u64) -> String {
        let counter = (unix_secs / self.step_secs).to_be_bytes();
        let digest = match self.algorithm {
            TotpAlgorithm::Sha1 => mac::<HmacSha1>(&self.key, &counter),
            TotpAlgorithm::Sha256 => mac::<HmacSha256>(&self.key, &counter),
        };
        let code = truncate(&digest) % 10u32.pow(self.digits);
        format!("{code:0width$}", width = self.digits as usize)
    }
}

impl OneTimeCodeSource for TotpGenerator {
    fn current_code(&self) -> Result<String> {
        let now = u64::try_from(Utc::now().timestamp()).map_err(|_| TotpError::ClockBeforeEpoch)?;
        debug!(step = now / self.step_secs, "Generating one-time code");
        Ok(self.code_at(now))
    }
}

fn mac<M: Mac + hmac::digest::KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so this never takes the fallback.
    let Ok(mut mac) = <M as hmac::digest::KeyInit>::new_from_slice(key) else {
        return Vec::new();
    };
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Dynamic truncation from RFC 4226 section 5.3.
fn truncate(digest: &[u8]) -> u32 {
    let Some(last) = digest.last() else {
        return 0;
    };
    let offset = usize::from(last & 0x0f);
    match digest.get(offset..offset + 4) {
        Some(&[a, b, c, d]) => u32::from_be_bytes([a & 0x7f, b, c, d]),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA1_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
    const SHA256_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQGEZA====";

    fn config(algorithm: TotpAlgorithm, digits: u32) -> TotpConfig {
        TotpConfig { algorithm, digits, step_secs: 30 }
    }

    #[test]
    fn matches_rfc_6238_sha1_vectors() {
        let totp = TotpGenerator::new(SHA1_SECRET, &config(TotpAlgorithm::Sha1, 6)).unwrap();
        assert_eq!(totp.code_at(59), "287082");
        assert_eq!(totp.code_at(1_111_111_109), "081804");

        let eight = TotpGenerator::new(SHA1_SECRET, &config(TotpAlgorithm::Sha1, 8)).unwrap();
        assert_eq!(eight.code_at(59), "94287082");
    }

    #[test]
    fn matches_rfc_6238_sha256_vectors() {
        let totp = TotpGenerator::new(SHA256_SECRET, &config(TotpAlgorithm::Sha256, 8)).unwrap();
        assert_eq!(totp.code_at(59), "46119246");
        assert_eq!(totp.code_at(1_111_111_109), "68084774");
    }

    #[test]
    fn tolerates_spaced_lowercase_secret() {
        let spaced = "gezd gnbv gy3t qojq gezd gnbv gy3t qojq";
        let totp = TotpGenerator::new(spaced, &config(TotpAlgorithm::Sha1, 6)).unwrap();
        assert_eq!(totp.code_at(59), "287082");
    }

    #[test]
    fn codes_change_with_time_step() {
        let totp = TotpGenerator::new(SHA1_SECRET, &TotpConfig::default()).unwrap();
        assert_eq!(totp.code_at(30), totp.code_at(59));
        assert_ne!(totp.code_at(59), totp.code_at(60));
    }

    #[test]
    fn rejects_unusable_parameters() {
        assert_eq!(
            TotpGenerator::new("  ", &TotpConfig::default()).unwrap_err(),
            TotpError::EmptySecret
        );
        assert!(matches!(
            TotpGenerator::new("not base32!", &TotpConfig::default()),
            Err(TotpError::InvalidSecret(_))
        ));
        assert_eq!(
            TotpGenerator::new(SHA1_SECRET, &config(TotpAlgorithm::Sha1, 4)).unwrap_err(),
            TotpError::InvalidDigits(4)
        );
    }

    #[test]
    fn current_code_has_configured_length() {
        let totp = TotpGenerator::new(SHA1_SECRET, &TotpConfig::default()).unwrap();
        let code = totp.current_code().unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
