use crate::identifiers::Identifier;
use itertools::Itertools;
use std::path::PathBuf;

/// What happened to one identifier that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    Downloaded(PathBuf),
    Skipped(PathBuf),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub downloaded: Vec<(Identifier, PathBuf)>,
    pub skipped: Vec<(Identifier, PathBuf)>,
    pub timed_out: Vec<Identifier>,
    pub failed: Vec<(Identifier, String)>,
}

impl BatchReport {
    /// Identifiers for which the UI sequence was started.
    pub fn attempted(&self) -> usize {
        self.downloaded.len() + self.timed_out.len() + self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.attempted() + self.skipped.len()
    }

    /// No identifier timed out or failed.
    pub fn is_complete_success(&self) -> bool {
        self.timed_out.is_empty() && self.failed.is_empty()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total(),
            downloaded = self.downloaded.len(),
            skipped = self.skipped.len(),
            timed_out = self.timed_out.len(),
            failed = self.failed.len(),
            "Batch complete"
        );
        if self.is_complete_success() {
            tracing::info!("Every identifier was downloaded or already present");
            return;
        }
        if !self.timed_out.is_empty() {
            tracing::warn!(
                "Downloads that did not complete: {}",
                self.timed_out.iter().join(", ")
            );
        }
        if !self.failed.is_empty() {
            tracing::warn!(
                "Identifiers that failed: {}",
                self.failed.iter().map(|(identifier, _)| identifier).join(", ")
            );
        }
    }
}
