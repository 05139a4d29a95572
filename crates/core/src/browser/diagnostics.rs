//! Best-effort diagnostic capture
//!
//! Every method here swallows its own failures after logging them, so a
//! broken screenshot never hides the error that triggered it.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::ports::{ArtifactSink, BrowserSession};

#[derive(Clone)]
pub struct Diagnostics {
    browser: Arc<dyn BrowserSession>,
    sink: Arc<dyn ArtifactSink>,
}

impl Diagnostics {
    pub fn new(browser: Arc<dyn BrowserSession>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self { browser, sink }
    }

    /// Log the current location and save a screenshot named `name`.
    pub async fn capture(&self, name: &str) -> Option<PathBuf> {
        match self.browser.current_url().await {
            Ok(url) => info!(url = %url, artifact = name, "Capturing diagnostics"),
            Err(err) => warn!(error = %err, "Could not read current location"),
        }
        self.screenshot(name).await
    }

    /// Log location and title, then save a `current_page` screenshot.
    pub async fn log_page_details(&self) {
        let url = self.browser.current_url().await.unwrap_or_else(|err| format!("<{err}>"));
        let title = self.browser.title().await.unwrap_or_else(|err| format!("<{err}>"));
        info!(url = %url, title = %title, "Current page");
        self.screenshot("current_page").await;
    }

    /// Save the full page source for offline inspection.
    pub async fn dump_page_source(&self) -> Option<PathBuf> {
        let html = match self.browser.page_source().await {
            Ok(html) => html,
            Err(err) => {
                warn!(error = %err, "Could not read page source");
                return None;
            }
        };
        match self.sink.save_page_source(&html).await {
            Ok(path) => {
                error!(path = %path.display(), "Page source saved");
                Some(path)
            }
            Err(err) => {
                warn!(error = %err, "Could not save page source");
                None
            }
        }
    }

    async fn screenshot(&self, name: &str) -> Option<PathBuf> {
        let png = match self.browser.screenshot_png().await {
            Ok(png) => png,
            Err(err) => {
                warn!(error = %err, artifact = name, "Screenshot failed");
                return None;
            }
        };
        match self.sink.save_screenshot(name, &png).await {
            Ok(path) => {
                info!(path = %path.display(), "Screenshot saved");
                Some(path)
            }
            Err(err) => {
                warn!(error = %err, artifact = name, "Could not store screenshot");
                None
            }
        }
    }
}
