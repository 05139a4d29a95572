//! Staging area that records files instead of writing them

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use shiftsync_core::StagingArea;
use shiftsync_domain::{CalendarEvent, Result as DomainResult};

#[derive(Default)]
pub struct RecordingStaging {
    staged: Mutex<Vec<PathBuf>>,
    discarded: Mutex<Vec<PathBuf>>,
}

impl RecordingStaging {
    /// Files staged so far and not discarded since.
    pub fn remaining(&self) -> Vec<PathBuf> {
        let discarded = self.discarded.lock().unwrap();
        self.staged
            .lock()
            .unwrap()
            .iter()
            .filter(|path| !discarded.contains(path))
            .cloned()
            .collect()
    }

    pub fn staged(&self) -> usize {
        self.staged.lock().unwrap().len()
    }

    pub fn discarded(&self) -> usize {
        self.discarded.lock().unwrap().len()
    }
}

#[async_trait]
impl StagingArea for RecordingStaging {
    async fn stage(&self, event: &CalendarEvent, _ics: &str) -> DomainResult<PathBuf> {
        let path = PathBuf::from("events").join(event.file_name());
        self.staged.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn discard(&self, path: &Path) -> DomainResult<()> {
        self.discarded.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
