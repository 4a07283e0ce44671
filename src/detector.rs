//! Download completion detection.
//!
//! Chromium writes archives into the download directory with a
//! `.crdownload` suffix while the transfer is running. The detector
//! snapshots the directory before the download trigger fires, then polls
//! it until the contents are free of in-progress markers, and identifies
//! the downloaded file as the entry that was not there before.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::DownloaderError;
use crate::surveys::canonical_name;

/// Suffixes Chromium's download manager uses for unfinished files.
const IN_PROGRESS_SUFFIXES: &[&str] = &[".crdownload", ".tmp"];

/// Contents of the download directory at one instant.
#[derive(Debug, Clone, Default)]
pub struct DirSnapshot {
    entries: BTreeSet<PathBuf>,
}

impl DirSnapshot {
    /// List the directory right now. A missing directory yields an empty
    /// snapshot rather than an error, matching a fresh output dir.
    pub fn capture(dir: &Path) -> Result<Self, DownloaderError> {
        let mut entries = BTreeSet::new();
        if dir.exists() {
            for entry in std::fs::read_dir(dir)? {
                entries.insert(entry?.path());
            }
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries present in `self` but not in `before`.
    pub fn new_since(&self, before: &DirSnapshot) -> Vec<PathBuf> {
        self.entries
            .difference(&before.entries)
            .cloned()
            .collect()
    }

    /// True when no entry carries an in-progress suffix.
    fn is_stable(&self) -> bool {
        self.entries.iter().all(|path| {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            !IN_PROGRESS_SUFFIXES
                .iter()
                .any(|suffix| name.ends_with(suffix))
        })
    }
}

/// Terminal outcome of one wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The directory stabilized and a new file appeared.
    Completed(PathBuf),
    /// The directory stabilized but nothing new appeared. Distinct from a
    /// timeout: the trigger most likely never started a download.
    NoNewFile,
    /// The stability condition never held within the budget.
    TimedOut,
}

/// Polls a download directory until a triggered download finishes.
#[derive(Debug, Clone)]
pub struct DownloadDetector {
    dir: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
}

impl DownloadDetector {
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            timeout,
            poll_interval,
        }
    }

    /// Wait for the download triggered after `before` was captured.
    ///
    /// One directory listing per poll interval. Polling stops when the
    /// directory holds at least one entry and none of them is an
    /// unfinished download; the new file is then whatever the current
    /// listing has that `before` did not. If several new files appeared
    /// at once, the most recently modified one wins (path order breaks
    /// remaining ties).
    pub async fn wait(&self, before: &DirSnapshot) -> Result<DownloadOutcome, DownloaderError> {
        let start = Instant::now();

        loop {
            tokio::time::sleep(self.poll_interval).await;

            let current = DirSnapshot::capture(&self.dir)?;
            if !current.is_empty() && current.is_stable() {
                let new_files = current.new_since(before);
                debug!(
                    "directory stable after {:?}, {} new entr{}",
                    start.elapsed(),
                    new_files.len(),
                    if new_files.len() == 1 { "y" } else { "ies" }
                );
                return match pick_newest(new_files) {
                    Some(path) => {
                        info!("download finished: {:?}", path);
                        Ok(DownloadOutcome::Completed(path))
                    }
                    None => {
                        warn!("directory stable but no new file in {:?}", self.dir);
                        Ok(DownloadOutcome::NoNewFile)
                    }
                };
            }

            if start.elapsed() >= self.timeout {
                warn!(
                    "download did not finish within {}s",
                    self.timeout.as_secs()
                );
                return Ok(DownloadOutcome::TimedOut);
            }
        }
    }
}

/// Deterministic choice among simultaneously appearing files: greatest
/// modification time, then path order.
fn pick_newest(mut files: Vec<PathBuf>) -> Option<PathBuf> {
    files.sort();
    files
        .into_iter()
        .max_by_key(|path| std::fs::metadata(path).and_then(|m| m.modified()).ok())
}

/// Rename a detected download to `eh_<year>.zip` in place.
///
/// Skipped when the canonical file already exists so a rerun never
/// clobbers an earlier result; the existing path is returned instead.
pub fn rename_to_canonical(path: &Path, year: u16) -> Result<PathBuf, DownloaderError> {
    let target = path
        .parent()
        .map(|dir| dir.join(canonical_name(year)))
        .ok_or_else(|| DownloaderError::Download(format!("no parent dir for {:?}", path)))?;

    if target.exists() {
        info!("{:?} already exists, keeping it", target);
        return Ok(target);
    }

    std::fs::rename(path, &target)?;
    info!("renamed {:?} -> {:?}", path, target);
    Ok(target)
}
