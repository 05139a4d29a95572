//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use roxmltree::Error as XmlError;
use shiftsync_domain::ShiftSyncError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ShiftSyncError);

impl From<InfraError> for ShiftSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ShiftSyncError> for InfraError {
    fn from(value: ShiftSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoShiftSyncError {
    fn into_shiftsync(self) -> ShiftSyncError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ShiftSyncError */
/* -------------------------------------------------------------------------- */

impl IntoShiftSyncError for HttpError {
    fn into_shiftsync(self) -> ShiftSyncError {
        if self.is_timeout() {
            return ShiftSyncError::transport("HTTP request timed out");
        }

        if self.is_connect() {
            return ShiftSyncError::transport(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let reason = status.canonical_reason().unwrap_or("unknown status");
            return match code {
                401 | 403 => {
                    ShiftSyncError::transport(format!("HTTP {code} {reason}: check credentials"))
                }
                _ => ShiftSyncError::transport(format!("HTTP {code} {reason}")),
            };
        }

        if self.is_decode() {
            return ShiftSyncError::transport(format!("undecodable HTTP response: {self}"));
        }

        ShiftSyncError::transport(format!("HTTP error: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_shiftsync())
    }
}

/* -------------------------------------------------------------------------- */
/* roxmltree::Error → ShiftSyncError */
/* -------------------------------------------------------------------------- */

impl IntoShiftSyncError for XmlError {
    fn into_shiftsync(self) -> ShiftSyncError {
        ShiftSyncError::transport(format!("malformed DAV response: {self}"))
    }
}

impl From<XmlError> for InfraError {
    fn from(value: XmlError) -> Self {
        InfraError(value.into_shiftsync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml / url → ShiftSyncError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(ShiftSyncError::document(format!("invalid JSON payload: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(ShiftSyncError::config(format!("Invalid TOML format: {value}")))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(ShiftSyncError::config(format!("invalid URL: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(ShiftSyncError::from(value))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
