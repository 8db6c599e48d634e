use crate::cli::CheckParams;
use crate::download::DownloadLayout;
use crate::error::DocFetchError;
use crate::identifiers::{Identifier, load_identifiers};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub already_present: Vec<(Identifier, PathBuf)>,
    pub to_fetch: Vec<Identifier>,
}

/// Offline dry run: loads the identifier list and reports which identifiers a `run` would skip.
pub async fn run_check(params: CheckParams) -> Result<CheckReport, DocFetchError> {
    let CheckParams { app_config } = params;

    let identifiers = load_identifiers(&app_config.identifiers.path).await?;
    let root = &app_config.download.root;
    let layout = app_config.download.layout;

    if layout == DownloadLayout::Flat {
        tracing::info!(
            "The flat layout cannot detect earlier downloads; every identifier will be fetched"
        );
    }

    let mut report = CheckReport::default();
    for identifier in identifiers {
        match layout.existing_artifact(root, &identifier).await? {
            Some(existing) => {
                tracing::info!(
                    identifier = %identifier,
                    "Would skip {}: {} exists",
                    identifier,
                    existing.display()
                );
                report.already_present.push((identifier, existing));
            }
            None => {
                tracing::info!(identifier = %identifier, "Would fetch {}", identifier);
                report.to_fetch.push(identifier);
            }
        }
    }

    tracing::info!(
        to_fetch = report.to_fetch.len(),
        already_present = report.already_present.len(),
        "Check complete"
    );
    Ok(report)
}
