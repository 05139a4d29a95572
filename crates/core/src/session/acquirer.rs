//! Login flow driving the portal's username, password and one-time-code
//! forms up to the scheduling document.

use std::sync::Arc;
use std::time::Duration;

use shiftsync_domain::{InteractionConfig, LoginFormConfig, PortalConfig, Result, ShiftSyncError};
use tracing::{debug, error, info, instrument, warn};

use crate::browser::{Action, BrowserSession, Diagnostics, RetryingInteractor, Waiter};
use crate::session::ports::OneTimeCodeSource;

/// Progress of one login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    CredentialsEntered,
    CodeEntered,
    Redirected,
    FallbackNavigated,
    Authenticated,
    Failed,
}

/// How the browser reached (or failed to reach) the scheduling document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arrival {
    /// The portal redirected on its own.
    Redirected,
    /// Explicit navigation after the redirect timed out.
    FallbackNavigated,
    /// Explicit navigation landed somewhere else. Extraction still runs.
    Unverified { landed_on: String },
}

impl Arrival {
    pub fn is_verified(&self) -> bool {
        !matches!(self, Self::Unverified { .. })
    }
}

#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

struct Timings {
    login_settle: Duration,
    redirect_timeout: Duration,
    fallback_settle: Duration,
}

pub struct SessionAcquirer {
    browser: Arc<dyn BrowserSession>,
    interactor: RetryingInteractor,
    diagnostics: Diagnostics,
    codes: Arc<dyn OneTimeCodeSource>,
    waiter: Waiter,
    login_url: String,
    schedule_url: String,
    credentials: LoginCredentials,
    form: LoginFormConfig,
    timings: Timings,
}

impl SessionAcquirer {
    /// # Errors
    /// Returns `ShiftSyncError::Config` for an invalid interaction policy.
    pub fn new(
        browser: Arc<dyn BrowserSession>,
        diagnostics: Diagnostics,
        codes: Arc<dyn OneTimeCodeSource>,
        portal: &PortalConfig,
        interaction: &InteractionConfig,
    ) -> Result<Self> {
        let interactor =
            RetryingInteractor::new(browser.clone(), diagnostics.clone(), interaction)?;
        Ok(Self {
            browser,
            interactor,
            diagnostics,
            codes,
            waiter: Waiter::new(interaction.poll_interval()),
            login_url: portal.login_url.clone(),
            schedule_url: portal.schedule_url.clone(),
            credentials: LoginCredentials {
                username: portal.username.clone(),
                password: portal.password.clone(),
            },
            form: portal.login_form.clone(),
            timings: Timings {
                login_settle: interaction.login_settle(),
                redirect_timeout: interaction.redirect_timeout(),
                fallback_settle: interaction.fallback_settle(),
            },
        })
    }

    /// Log in and bring the browser to the scheduling document.
    ///
    /// A missed redirect is recovered by explicit navigation. If that lands
    /// elsewhere the result is [`Arrival::Unverified`] rather than an error.
    ///
    /// # Errors
    /// `InteractionExhausted` when a form control never becomes usable, or
    /// any browser failure outside the redirect wait.
    #[instrument(skip(self), fields(login_url = %self.login_url))]
    pub async fn acquire(&self) -> Result<Arrival> {
        let mut state = SessionState::Start;
        match self.run(&mut state).await {
            Ok(arrival) => Ok(arrival),
            Err(err) => {
                error!(error = %err, last_state = ?state, "Session acquisition failed");
                transition(&mut state, SessionState::Failed);
                Err(err)
            }
        }
    }

    async fn run(&self, state: &mut SessionState) -> Result<Arrival> {
        info!("Starting login");
        self.browser.navigate(&self.login_url).await?;
        tokio::time::sleep(self.timings.login_settle).await;

        self.interactor.type_text(&self.form.username_field, &self.credentials.username).await?;
        self.interactor.click(&self.form.username_next).await?;
        self.interactor.type_text(&self.form.password_field, &self.credentials.password).await?;
        info!("Password entered");
        self.interactor.click(&self.form.password_submit).await?;
        transition(state, SessionState::CredentialsEntered);

        self.interactor
            .perform(&self.form.code_field, Action::TypeOneTimeCode(self.codes.as_ref()))
            .await?;
        info!("One-time code entered");
        self.interactor.click(&self.form.code_submit).await?;
        transition(state, SessionState::CodeEntered);

        let arrival = self.await_schedule().await?;
        match arrival {
            Arrival::Redirected => {
                transition(state, SessionState::Redirected);
                transition(state, SessionState::Authenticated);
            }
            Arrival::FallbackNavigated => {
                transition(state, SessionState::FallbackNavigated);
                transition(state, SessionState::Authenticated);
            }
            Arrival::Unverified { .. } => transition(state, SessionState::FallbackNavigated),
        }
        Ok(arrival)
    }

    async fn await_schedule(&self) -> Result<Arrival> {
        let timeout = self.timings.redirect_timeout;
        let wait = self
            .waiter
            .until_url_contains(self.browser.as_ref(), &self.schedule_url, timeout)
            .await;

        match wait {
            Ok(url) => {
                info!(url = %url, "Redirected to schedule");
                Ok(Arrival::Redirected)
            }
            Err(err) if err.is_timeout() => {
                let actual = self.browser.current_url().await.unwrap_or_default();
                let redirect = ShiftSyncError::RedirectionTimeout {
                    expected: self.schedule_url.clone(),
                    actual,
                };
                warn!(error = %redirect, "Redirect did not happen, navigating explicitly");
                self.navigate_fallback().await
            }
            Err(err) => Err(err),
        }
    }

    async fn navigate_fallback(&self) -> Result<Arrival> {
        self.browser.navigate(&self.schedule_url).await?;
        tokio::time::sleep(self.timings.fallback_settle).await;
        self.diagnostics.log_page_details().await;

        let landed_on = self.browser.current_url().await?;
        if landed_on.contains(&self.schedule_url) {
            info!("Explicit navigation to schedule succeeded");
            Ok(Arrival::FallbackNavigated)
        } else {
            error!(url = %landed_on, "Explicit navigation to schedule failed");
            self.diagnostics.capture("failed_navigation").await;
            Ok(Arrival::Unverified { landed_on })
        }
    }
}

fn transition(state: &mut SessionState, next: SessionState) {
    debug!(from = ?*state, to = ?next, "Session state change");
    *state = next;
}
