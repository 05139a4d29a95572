//! Scriptable browser, artifact sink and one-time-code fakes

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use shiftsync_core::{ArtifactSink, BrowserSession, ElementHandle, ElementState, OneTimeCodeSource};
use shiftsync_domain::{Locator, Result as DomainResult, ShiftSyncError};

use super::{artifact_path, SCHEDULE_URL};

/// Portal stand-in driven entirely from memory.
///
/// Every locator resolves to a displayed, enabled element unless it was
/// listed with [`FakeBrowser::without`]. Clicking the one-time-code submit
/// button redirects to the schedule when `redirects` is set.
pub struct FakeBrowser {
    page: String,
    redirects: bool,
    schedule_reachable: bool,
    missing: HashSet<String>,
    state: Mutex<BrowserState>,
}

#[derive(Default)]
struct BrowserState {
    url: String,
    navigations: Vec<String>,
    typed: Vec<(String, String)>,
    clicks: Vec<String>,
    quits: usize,
}

impl FakeBrowser {
    pub fn new(page: &str) -> Self {
        Self {
            page: page.to_string(),
            redirects: true,
            schedule_reachable: true,
            missing: HashSet::new(),
            state: Mutex::new(BrowserState::default()),
        }
    }

    /// Never redirect after the one-time code is submitted.
    pub fn without_redirect(mut self) -> Self {
        self.redirects = false;
        self
    }

    /// Explicit navigation to the schedule lands on an error page instead.
    pub fn schedule_unreachable(mut self) -> Self {
        self.schedule_reachable = false;
        self
    }

    /// `locator` never matches anything.
    pub fn without(mut self, locator: &Locator) -> Self {
        self.missing.insert(locator.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn quits(&self) -> usize {
        self.state.lock().unwrap().quits
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn navigate(&self, url: &str) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.url = if url == SCHEDULE_URL && !self.schedule_reachable {
            "https://portal.test/error".to_string()
        } else {
            url.to_string()
        };
        Ok(())
    }

    async fn current_url(&self) -> DomainResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn title(&self) -> DomainResult<String> {
        Ok("My Schedule".to_string())
    }

    async fn find_element(&self, locator: &Locator) -> DomainResult<Option<ElementHandle>> {
        let key = locator.to_string();
        if self.missing.contains(&key) {
            return Ok(None);
        }
        Ok(Some(ElementHandle(key)))
    }

    async fn element_state(&self, _element: &ElementHandle) -> DomainResult<ElementState> {
        Ok(ElementState { displayed: true, enabled: true })
    }

    async fn click(&self, element: &ElementHandle) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(element.0.clone());
        if self.redirects && element.0 == "id=idSubmit_SAOTCC_Continue" {
            state.url = SCHEDULE_URL.to_string();
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DomainResult<()> {
        self.state.lock().unwrap().typed.push((element.0.clone(), text.to_string()));
        Ok(())
    }

    async fn screenshot_png(&self) -> DomainResult<Vec<u8>> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn page_source(&self) -> DomainResult<String> {
        Ok(self.page.clone())
    }

    async fn quit(&self) -> DomainResult<()> {
        self.state.lock().unwrap().quits += 1;
        Ok(())
    }
}

/// Records artifact names instead of writing files.
#[derive(Default)]
pub struct RecordingArtifacts {
    screenshots: Mutex<Vec<String>>,
    page_dumps: AtomicUsize,
    fail: bool,
}

impl RecordingArtifacts {
    /// Every save fails, to check that diagnostics never mask errors.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn screenshots(&self) -> Vec<String> {
        self.screenshots.lock().unwrap().clone()
    }

    pub fn page_dumps(&self) -> usize {
        self.page_dumps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactSink for RecordingArtifacts {
    async fn save_screenshot(&self, name: &str, _png: &[u8]) -> DomainResult<PathBuf> {
        if self.fail {
            return Err(ShiftSyncError::io("disk full"));
        }
        self.screenshots.lock().unwrap().push(name.to_string());
        Ok(artifact_path(name))
    }

    async fn save_page_source(&self, _html: &str) -> DomainResult<PathBuf> {
        if self.fail {
            return Err(ShiftSyncError::io("disk full"));
        }
        self.page_dumps.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from("page_source_error.html"))
    }
}

/// One-time-code source returning a fixed code and counting requests.
#[derive(Default)]
pub struct FixedCode {
    calls: AtomicUsize,
}

impl FixedCode {
    pub const CODE: &'static str = "287082";

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OneTimeCodeSource for FixedCode {
    fn current_code(&self) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::CODE.to_string())
    }
}
