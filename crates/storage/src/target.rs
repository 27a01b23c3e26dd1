use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use common::log::debug;

use crate::OutputError;

pub const VIDEO_EXTENSION: &str = "mp4";

/// Where a recording is written. Resolved once, right before the stream opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Exactly this path.
    Fixed(PathBuf),
    /// `<dir>/<prefix>_<YYYYMMDD_HHMMSS>.mp4`
    Timestamped { dir: PathBuf, prefix: String },
}

impl OutputTarget {
    pub fn timestamped(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        OutputTarget::Timestamped {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn resolve_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            OutputTarget::Fixed(path) => path.clone(),
            OutputTarget::Timestamped { dir, prefix } => {
                dir.join(timestamped_file_name(prefix, now))
            }
        }
    }

    /// Resolves against the local clock and creates the parent directory.
    pub fn prepare(&self) -> Result<PathBuf, OutputError> {
        let path = self.resolve_at(&Local::now());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        Ok(path)
    }
}

fn create_dir(dir: &Path) -> Result<(), OutputError> {
    if !dir.exists() {
        debug!("[storage] creating output directory {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

pub fn timestamped_file_name<Tz: TimeZone>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        prefix,
        now.format("%Y%m%d_%H%M%S"),
        VIDEO_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 31).unwrap()
    }

    #[test]
    fn timestamped_name_uses_prefix_and_compact_time() {
        assert_eq!(
            timestamped_file_name("google_chat", &fixed_time()),
            "google_chat_20250307_090531.mp4"
        );
    }

    #[test]
    fn timestamped_target_joins_directory() {
        let target = OutputTarget::timestamped("recordings", "chat_region");
        assert_eq!(
            target.resolve_at(&fixed_time()),
            PathBuf::from("recordings/chat_region_20250307_090531.mp4")
        );
    }

    #[test]
    fn fixed_target_ignores_clock() {
        let target = OutputTarget::Fixed(PathBuf::from("/tmp/call.mp4"));
        assert_eq!(target.resolve_at(&fixed_time()), PathBuf::from("/tmp/call.mp4"));
    }

    #[test]
    fn prepare_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("recordings");
        let target = OutputTarget::timestamped(&dir, "chat");

        let path = target.prepare().unwrap();

        assert!(dir.is_dir());
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert!(!path.exists());
    }
}
