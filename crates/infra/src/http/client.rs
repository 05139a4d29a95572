//! Retrying HTTP client for the calendar stores and the WebDriver endpoint
//!
//! Connection failures, timeouts and `5xx` answers are retried with
//! exponential backoff. Every other status goes back to the caller, which
//! owns the protocol-level meaning of it (`207` for DAV, `404` for a
//! missing element, and so on).

use std::time::Duration;

use reqwest::{Client, IntoUrl, Method, RequestBuilder, Response};
use shiftsync_domain::{Result, ShiftSyncError};
use tracing::{debug, warn};

use crate::errors::InfraError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_ATTEMPTS: usize = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Cap on backoff doublings.
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    attempts: usize,
    backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        self.inner.request(method, url)
    }

    /// Request with a WebDAV extension method such as `PROPFIND` or `REPORT`.
    ///
    /// # Errors
    /// `Internal` when `method` is not a valid HTTP token.
    pub fn dav_request(&self, method: &str, url: impl IntoUrl) -> Result<RequestBuilder> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|err| ShiftSyncError::internal(format!("bad HTTP method {method}: {err}")))?;
        Ok(self.inner.request(method, url))
    }

    /// Send `request`, retrying transient failures.
    ///
    /// # Errors
    /// `Transport` or `Timeout` once the attempts are used up or the failure
    /// is not transient. `Internal` for a streaming body, which cannot be
    /// replayed.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let replay = request.try_clone().ok_or_else(|| {
                ShiftSyncError::internal("streaming request bodies cannot be retried")
            })?;
            let last = attempt >= self.attempts;

            match replay.send().await {
                Ok(response) if response.status().is_server_error() && !last => {
                    warn!(
                        url = %response.url(),
                        status = %response.status(),
                        attempt,
                        "Server error, retrying"
                    );
                }
                Ok(response) => {
                    debug!(url = %response.url(), status = %response.status(), "HTTP response");
                    return Ok(response);
                }
                Err(err) if is_transient(&err) && !last => {
                    warn!(error = %err, attempt, "HTTP request failed, retrying");
                }
                Err(err) => return Err(InfraError::from(err).into()),
            }

            tokio::time::sleep(self.delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Backoff before retry number `attempt`: `backoff`, then doubling.
    fn delay(&self, attempt: usize) -> Duration {
        let doublings = u32::try_from(attempt.saturating_sub(1))
            .unwrap_or(MAX_BACKOFF_DOUBLINGS)
            .min(MAX_BACKOFF_DOUBLINGS);
        self.backoff.saturating_mul(1 << doublings)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("attempts", &self.attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    timeout: Duration,
    attempts: usize,
    backoff: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT, attempts: DEFAULT_ATTEMPTS, backoff: DEFAULT_BACKOFF }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout, connection included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts per request; `1` disables retries.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// # Errors
    /// `Config` when the TLS backend cannot be initialised.
    pub fn build(self) -> Result<HttpClient> {
        let inner = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("shiftsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ShiftSyncError::config(format!("cannot build HTTP client: {err}")))?;
        Ok(HttpClient { inner, attempts: self.attempts, backoff: self.backoff })
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
