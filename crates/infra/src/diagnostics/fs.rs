//! Screenshots and page dumps on the local filesystem

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shiftsync_core::ArtifactSink;
use shiftsync_domain::{PathsConfig, Result};
use tracing::debug;

/// Writes screenshots as `<dir>/<name>.png` and the page source to a fixed
/// file. Directories are created on first use.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    dir: PathBuf,
    page_dump: PathBuf,
}

impl FsArtifactSink {
    pub fn new(dir: impl Into<PathBuf>, page_dump: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), page_dump: page_dump.into() }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(&paths.diagnostics_dir, &paths.page_source_dump)
    }

    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", file_stem(name)))
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn save_screenshot(&self, name: &str, png: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.screenshot_path(name);
        tokio::fs::write(&path, png).await?;
        debug!(path = %path.display(), bytes = png.len(), "Screenshot written");
        Ok(path)
    }

    async fn save_page_source(&self, html: &str) -> Result<PathBuf> {
        ensure_parent(&self.page_dump).await?;
        tokio::fs::write(&self.page_dump, html).await?;
        Ok(self.page_dump.clone())
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            tokio::fs::create_dir_all(parent).await?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Artifact names embed rendered dates, so anything outside
/// `[A-Za-z0-9_-]` becomes `_`.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "screenshot".to_string()
    } else {
        stem
    }
}
