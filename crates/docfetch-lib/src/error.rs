use crate::session::DownloadStep;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid command-line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Failed to read identifier list from {path}: {reason}")]
    IdentifierList { path: PathBuf, reason: String },

    #[error("Login failed: {reason}")]
    Login { reason: String },

    #[error("Failed to open the product search view: {reason}")]
    Navigation { reason: String },

    #[error("Browser operation '{action}' failed: {reason}")]
    Browser { action: String, reason: String },

    #[error("Timed out after {timeout:?} waiting for element {locator}")]
    ElementWait { locator: String, timeout: Duration },

    #[error("No result or UI error for {identifier} while entering {state}: {reason}")]
    NoResultOrUiError {
        identifier: String,
        state: DownloadStep,
        reason: String,
    },

    #[error("Download for {identifier} did not complete within {timeout:?}")]
    DownloadTimeout {
        identifier: String,
        timeout: Duration,
    },

    #[error("Failed to move {} to {}: {reason}", download.display(), artifact.display())]
    Organize {
        download: PathBuf,
        artifact: PathBuf,
        reason: String,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl DocFetchError {
    pub fn browser(
        action: impl Into<String>,
    ) -> impl FnOnce(thirtyfour::error::WebDriverError) -> Self {
        let action = action.into();
        move |e| Self::Browser {
            action,
            reason: e.to_string(),
        }
    }
}
