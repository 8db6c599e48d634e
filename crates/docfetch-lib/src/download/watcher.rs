use super::types::ResolvedDownload;
use crate::error::DocFetchError;
use crate::identifiers::Identifier;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

pub const DEFAULT_PENDING_SUFFIXES: &[&str] = &[".crdownload", ".part", ".tmp"];

/// Polls a directory for files the browser has finished writing.
#[derive(Clone, Debug)]
pub struct DownloadWatcher {
    watch_dir: PathBuf,
    poll_interval: Duration,
    pending_suffixes: Vec<String>,
    guard_identifier_stem: bool,
}

#[derive(Debug)]
struct Candidate {
    path: PathBuf,
    file_name: OsString,
    modified: SystemTime,
}

impl Candidate {
    fn is_newer_than(&self, other: &Candidate) -> bool {
        (self.modified, &self.file_name) > (other.modified, &other.file_name)
    }
}

impl DownloadWatcher {
    pub fn new(watch_dir: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            poll_interval,
            pending_suffixes: DEFAULT_PENDING_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            guard_identifier_stem: false,
        }
    }

    pub fn with_pending_suffixes(mut self, suffixes: impl IntoIterator<Item = String>) -> Self {
        self.pending_suffixes = suffixes.into_iter().collect();
        self
    }

    /// Ignore files whose stem already equals the identifier in flight, so an artifact renamed
    /// in place is never picked up again.
    pub fn with_identifier_stem_guard(mut self, enabled: bool) -> Self {
        self.guard_identifier_stem = enabled;
        self
    }

    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    fn is_pending(&self, file_name: &OsStr) -> bool {
        let name = file_name.to_string_lossy();
        self.pending_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Every regular file currently in the watch directory, pending or not.
    pub async fn snapshot(&self) -> std::io::Result<HashSet<PathBuf>> {
        let mut files = HashSet::new();
        let mut entries = tokio::fs::read_dir(&self.watch_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.insert(entry.path());
            }
        }
        Ok(files)
    }

    async fn newest_candidate(
        &self,
        identifier: &Identifier,
        excluded: &HashSet<PathBuf>,
    ) -> std::io::Result<Option<Candidate>> {
        let mut best: Option<Candidate> = None;
        let mut entries = tokio::fs::read_dir(&self.watch_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            if self.is_pending(&file_name) {
                continue;
            }

            let path = entry.path();
            if excluded.contains(&path) {
                continue;
            }
            if self.guard_identifier_stem
                && path.file_stem() == Some(OsStr::new(identifier.as_str()))
            {
                continue;
            }

            // The browser renames its partial file on completion, so entries can vanish between
            // the listing and the stat.
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            if !metadata.is_file() {
                continue;
            }

            let candidate = Candidate {
                path,
                file_name,
                modified: metadata.modified()?,
            };
            if best
                .as_ref()
                .is_none_or(|current| candidate.is_newer_than(current))
            {
                best = Some(candidate);
            }
        }

        Ok(best)
    }

    /// Waits until a completed file that is not in `excluded` shows up and returns the most
    /// recently modified one. Files carrying a pending suffix are never returned.
    pub async fn await_new_artifact(
        &self,
        identifier: &Identifier,
        excluded: &HashSet<PathBuf>,
        timeout: Duration,
    ) -> Result<ResolvedDownload, DocFetchError> {
        // A timeout too large to represent means waiting without a deadline.
        let deadline = Instant::now().checked_add(timeout);
        tracing::debug!(
            identifier = %identifier,
            watch_dir = %self.watch_dir.display(),
            excluded = excluded.len(),
            "Waiting for download to complete"
        );

        loop {
            if let Some(candidate) = self.newest_candidate(identifier, excluded).await? {
                tracing::debug!(
                    identifier = %identifier,
                    path = %candidate.path.display(),
                    "Download completed"
                );
                return Ok(ResolvedDownload::new(candidate.path));
            }

            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(DocFetchError::DownloadTimeout {
                            identifier: identifier.to_string(),
                            timeout,
                        });
                    }
                    self.poll_interval.min(deadline - now)
                }
                None => self.poll_interval,
            };
            tokio::time::sleep(pause).await;
        }
    }
}
