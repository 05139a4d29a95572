//! Port interfaces for browser automation
//!
//! These traits define the boundary between the pipeline and whatever
//! drives the rendered scheduling document.

use std::path::PathBuf;

use async_trait::async_trait;
use shiftsync_domain::{Locator, Result};

/// Opaque reference to an element of the current document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

/// Interactability of an element at the moment it was queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementState {
    pub displayed: bool,
    pub enabled: bool,
}

/// One authenticated browser session.
///
/// Calls are strictly sequential; implementations need not support
/// concurrent use.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// First element matching `locator`, or `None` when nothing matches yet.
    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementHandle>>;

    async fn element_state(&self, element: &ElementHandle) -> Result<ElementState>;

    /// Activate the element through script, bypassing overlay checks.
    async fn click(&self, element: &ElementHandle) -> Result<()>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()>;

    async fn screenshot_png(&self) -> Result<Vec<u8>>;

    async fn page_source(&self) -> Result<String>;

    /// Release the session. Called exactly once at the end of a run.
    async fn quit(&self) -> Result<()>;
}

/// Destination for operator-facing debugging artifacts
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store a screenshot under `name` and return where it went.
    async fn save_screenshot(&self, name: &str, png: &[u8]) -> Result<PathBuf>;

    /// Store the full page source and return where it went.
    async fn save_page_source(&self, html: &str) -> Result<PathBuf>;
}
