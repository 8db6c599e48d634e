use super::report::{BatchReport, ItemOutcome};
use crate::browser::Browser;
use crate::config::{Credentials, DownloadConfig, TimingConfig};
use crate::download::{DownloadLayout, DownloadWatcher, ProcessedSet, finalize};
use crate::error::DocFetchError;
use crate::identifiers::Identifier;
use crate::session::SessionDriver;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub download_root: PathBuf,
    pub layout: DownloadLayout,
    pub pending_suffixes: Vec<String>,
    pub poll_interval: Duration,
    pub download_timeout: Duration,
    pub inter_item_delay: Duration,
}

impl BatchOptions {
    pub fn from_config(
        download_root: PathBuf,
        download: &DownloadConfig,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            download_root,
            layout: download.layout,
            pending_suffixes: download.pending_suffixes.clone(),
            poll_interval: download.poll_interval(),
            download_timeout: download.timeout(),
            inter_item_delay: timing.inter_item_delay(),
        }
    }
}

/// Runs one batch: a single session, identifiers strictly one at a time. Sequential processing
/// is what makes the anonymous download attributable to the identifier in flight.
pub struct BatchController<B: Browser> {
    session: SessionDriver<B>,
    watcher: DownloadWatcher,
    options: BatchOptions,
}

impl<B: Browser> BatchController<B> {
    pub fn new(session: SessionDriver<B>, options: BatchOptions) -> Self {
        let watcher = DownloadWatcher::new(&options.download_root, options.poll_interval)
            .with_pending_suffixes(options.pending_suffixes.iter().cloned())
            .with_identifier_stem_guard(options.layout.guards_identifier_stem());
        Self {
            session,
            watcher,
            options,
        }
    }

    /// Logs in, processes every identifier in order and always shuts the session down. Only
    /// setup failures (login, search view) are returned as errors; per-identifier failures
    /// end up in the report.
    pub async fn run(
        mut self,
        identifiers: &[Identifier],
        credentials: &Credentials,
    ) -> Result<BatchReport, DocFetchError> {
        let result = self.run_identifiers(identifiers, credentials).await;

        if let Err(err) = self.session.shutdown().await {
            tracing::warn!(error = %err, "Failed to close browser session");
        }

        let report = result?;
        report.log_summary();
        Ok(report)
    }

    async fn run_identifiers(
        &mut self,
        identifiers: &[Identifier],
        credentials: &Credentials,
    ) -> Result<BatchReport, DocFetchError> {
        self.session.login(credentials).await?;
        self.session.open_search_view().await?;

        let mut processed = ProcessedSet::default();
        let mut report = BatchReport::default();
        let total = identifiers.len();

        for (index, identifier) in identifiers.iter().enumerate() {
            tracing::info!(
                identifier = %identifier,
                "Searching for ID {} ({}/{})",
                identifier,
                index + 1,
                total
            );

            match self.process(identifier, &mut processed).await {
                Ok(ItemOutcome::Skipped(existing)) => {
                    tracing::info!(
                        identifier = %identifier,
                        path = %existing.display(),
                        "File for {} already exists, skipping download",
                        identifier
                    );
                    report.skipped.push((identifier.clone(), existing));
                    continue;
                }
                Ok(ItemOutcome::Downloaded(artifact)) => {
                    tracing::info!(
                        identifier = %identifier,
                        path = %artifact.display(),
                        outcome = "success",
                        "Successfully downloaded and moved file for {}",
                        identifier
                    );
                    report.downloaded.push((identifier.clone(), artifact));
                }
                Err(err @ DocFetchError::DownloadTimeout { .. }) => {
                    tracing::warn!(identifier = %identifier, "Download may have failed: {}", err);
                    report.timed_out.push(identifier.clone());
                }
                Err(err) => {
                    tracing::error!(
                        identifier = %identifier,
                        "No PDF found or error for {}; skipping: {}",
                        identifier,
                        err
                    );
                    tracing::debug!(identifier = %identifier, error = ?err, "Failure details");
                    report.failed.push((identifier.clone(), err.to_string()));
                }
            }

            if index + 1 < total && !self.options.inter_item_delay.is_zero() {
                tokio::time::sleep(self.options.inter_item_delay).await;
            }
        }

        Ok(report)
    }

    async fn process(
        &mut self,
        identifier: &Identifier,
        processed: &mut ProcessedSet,
    ) -> Result<ItemOutcome, DocFetchError> {
        let root = &self.options.download_root;
        let layout = self.options.layout;

        if let Some(existing) = layout.existing_artifact(root, identifier).await? {
            return Ok(ItemOutcome::Skipped(existing));
        }

        // Taken before the download is requested, so a fast transfer cannot slip into the
        // exclusion set.
        let snapshot: HashSet<PathBuf>;
        let excluded = match layout {
            DownloadLayout::Nested => {
                snapshot = self.watcher.snapshot().await?;
                &snapshot
            }
            DownloadLayout::Flat => processed.as_set(),
        };

        self.session.search_and_request_download(identifier).await?;

        let download = self
            .watcher
            .await_new_artifact(identifier, excluded, self.options.download_timeout)
            .await?;

        let target_dir = layout.target_dir(root, identifier);
        let artifact = finalize(&download.path, identifier, &target_dir).await?;

        if layout == DownloadLayout::Flat {
            processed.claim(artifact.clone());
        }
        Ok(ItemOutcome::Downloaded(artifact))
    }
}
