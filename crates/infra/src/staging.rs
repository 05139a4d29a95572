//! On-disk staging of `<uid>.ics` files

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shiftsync_core::StagingArea;
use shiftsync_domain::{CalendarEvent, Result};
use tracing::debug;

/// Stages each pending event as `<dir>/<uid>.ics`.
#[derive(Debug, Clone)]
pub struct FsStaging {
    dir: PathBuf,
}

impl FsStaging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl StagingArea for FsStaging {
    async fn stage(&self, event: &CalendarEvent, ics: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(event.file_name());
        tokio::fs::write(&path, ics).await?;
        debug!(path = %path.display(), "Event staged");
        Ok(path)
    }

    async fn discard(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Staged event removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::US::Eastern;
    use tempfile::TempDir;

    use super::*;

    fn event() -> CalendarEvent {
        let start = Eastern.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();
        let end = Eastern.with_ymd_and_hms(2025, 1, 6, 17, 0, 0).unwrap();
        CalendarEvent::new("abc@shiftsync.local", start, end, "Front Desk", Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn stages_under_uid_file_name() {
        let temp = TempDir::new().unwrap();
        let staging = FsStaging::new(temp.path().join("events"));

        let path = staging.stage(&event(), "BEGIN:VCALENDAR\r\n").await.unwrap();

        assert_eq!(path, temp.path().join("events").join("abc@shiftsync.local.ics"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "BEGIN:VCALENDAR\r\n");
    }

    #[tokio::test]
    async fn discard_tolerates_missing_files() {
        let temp = TempDir::new().unwrap();
        let staging = FsStaging::new(temp.path());

        let path = staging.stage(&event(), "x").await.unwrap();
        staging.discard(&path).await.unwrap();
        assert!(!path.exists());
        staging.discard(&path).await.unwrap();
    }
}
