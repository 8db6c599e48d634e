use crate::cli::args::{Command, ConfigOverrides};
use crate::cli::params::{CheckParams, RunParams};
use crate::config::{Config, Credentials, DEFAULT_CONFIG_PATH, load_config};
use crate::error::DocFetchError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Run(RunParams),
    Check(CheckParams),
}

fn load_with_overrides(
    config_path: Option<String>,
    overrides: ConfigOverrides,
) -> Result<Config, DocFetchError> {
    let mut app_config = match config_path {
        Some(config_path) => load_config(&config_path, true)?,
        None => load_config(DEFAULT_CONFIG_PATH, false)?,
    };

    let ConfigOverrides {
        identifiers_path,
        download_dir,
        layout,
    } = overrides;
    if let Some(identifiers_path) = identifiers_path {
        app_config.identifiers.path = identifiers_path;
    }
    if let Some(download_dir) = download_dir {
        app_config.download.root = download_dir;
    }
    if let Some(layout) = layout {
        app_config.download.layout = layout;
    }

    Ok(app_config)
}

/// Longest wait accepted for any timeout or poll interval.
pub const MAX_WAIT_SECS: u64 = 7 * 24 * 60 * 60;

/// Rejects values that would make a wait end immediately, overflow a deadline or leave a URL
/// unusable.
pub fn validate_config(app_config: &Config) -> Result<(), DocFetchError> {
    let download = &app_config.download;
    let timing = &app_config.timing;
    let waits = [
        ("download.timeout_secs", download.timeout(), download.timeout_secs),
        ("download.poll_interval_ms", download.poll_interval(), download.poll_interval_ms),
        ("timing.element_wait_secs", timing.element_wait(), timing.element_wait_secs),
        (
            "timing.download_button_wait_secs",
            timing.download_button_wait(),
            timing.download_button_wait_secs,
        ),
        (
            "timing.continue_dialog_wait_secs",
            timing.continue_dialog_wait(),
            timing.continue_dialog_wait_secs,
        ),
        ("timing.element_poll_ms", timing.element_poll(), timing.element_poll_ms),
    ];
    for (name, wait, value) in waits {
        if value == 0 {
            return Err(DocFetchError::CliArgumentValidation {
                details: format!("{name} must be greater than 0."),
            });
        }
        if wait > Duration::from_secs(MAX_WAIT_SECS) {
            return Err(DocFetchError::CliArgumentValidation {
                details: format!(
                    "{name} must not exceed {MAX_WAIT_SECS} seconds (got {value})."
                ),
            });
        }
    }

    for (name, value) in [
        ("portal.login_url", &app_config.portal.login_url),
        ("portal.search_url", &app_config.portal.search_url),
        ("webdriver.server_url", &app_config.webdriver.server_url),
    ] {
        url::Url::parse(value).map_err(|e| DocFetchError::CliArgumentValidation {
            details: format!("{name} is not a valid URL ({value}): {e}"),
        })?;
    }

    if app_config
        .download
        .pending_suffixes
        .iter()
        .any(|suffix| suffix.is_empty())
    {
        return Err(DocFetchError::CliArgumentValidation {
            details: "download.pending_suffixes must not contain empty entries.".to_string(),
        });
    }

    Ok(())
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, DocFetchError> {
    match command {
        Command::Run {
            config_path,
            overrides,
            webdriver_url,
            headless,
            download_timeout_secs,
        } => {
            let mut app_config = load_with_overrides(config_path, overrides)?;
            if let Some(webdriver_url) = webdriver_url {
                app_config.webdriver.server_url = webdriver_url;
            }
            if headless {
                app_config.webdriver.headless = true;
            }
            if let Some(download_timeout_secs) = download_timeout_secs {
                app_config.download.timeout_secs = download_timeout_secs;
            }
            validate_config(&app_config)?;

            Ok(ResolvedCommand::Run(RunParams {
                app_config,
                credentials: Credentials::from_env(),
            }))
        }
        Command::Check {
            config_path,
            overrides,
        } => {
            let app_config = load_with_overrides(config_path, overrides)?;
            validate_config(&app_config)?;
            Ok(ResolvedCommand::Check(CheckParams { app_config }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DownloadLayout;
    use std::path::PathBuf;

    fn write_config(dir: &std::path::Path, contents: &str) -> String {
        let path = dir.join("docfetch.yaml");
        std::fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_check_applies_overrides_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            "download:\n  root: /from/file\n  layout: nested\nidentifiers:\n  path: file-list.txt\n",
        );

        let resolved = resolve_command(Command::Check {
            config_path: Some(config_path),
            overrides: ConfigOverrides {
                identifiers_path: Some(PathBuf::from("cli-list.txt")),
                download_dir: None,
                layout: Some(DownloadLayout::Flat),
            },
        })
        .unwrap();

        let ResolvedCommand::Check(params) = resolved else {
            panic!("expected a check command");
        };
        assert_eq!(params.app_config.download.root, PathBuf::from("/from/file"));
        assert_eq!(params.app_config.download.layout, DownloadLayout::Flat);
        assert_eq!(
            params.app_config.identifiers.path,
            PathBuf::from("cli-list.txt")
        );
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");

        let result = resolve_command(Command::Check {
            config_path: Some(missing.to_str().unwrap().to_string()),
            overrides: ConfigOverrides::default(),
        });
        assert!(matches!(result, Err(DocFetchError::Config(_))));
    }

    #[test]
    fn test_zero_download_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "download:\n  root: /tmp/dl\n");

        let result = resolve_command(Command::Run {
            config_path: Some(config_path),
            overrides: ConfigOverrides::default(),
            webdriver_url: None,
            headless: false,
            download_timeout_secs: Some(0),
        });
        assert!(matches!(
            result,
            Err(DocFetchError::CliArgumentValidation { details })
                if details.contains("download.timeout_secs")
        ));
    }

    #[test]
    fn test_unbounded_download_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "download:\n  root: /tmp/dl\n");

        let result = resolve_command(Command::Run {
            config_path: Some(config_path),
            overrides: ConfigOverrides::default(),
            webdriver_url: None,
            headless: false,
            download_timeout_secs: Some(u64::MAX),
        });
        assert!(matches!(
            result,
            Err(DocFetchError::CliArgumentValidation { details })
                if details.contains("download.timeout_secs")
        ));
    }

    #[test]
    fn test_oversized_element_wait_from_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "timing:\n  element_wait_secs: 9999999999\n");

        let result = resolve_command(Command::Check {
            config_path: Some(config_path),
            overrides: ConfigOverrides::default(),
        });
        assert!(matches!(
            result,
            Err(DocFetchError::CliArgumentValidation { details })
                if details.contains("timing.element_wait_secs")
        ));
    }

    #[test]
    fn test_longest_accepted_wait_is_valid() {
        let mut app_config = Config::default();
        app_config.download.timeout_secs = MAX_WAIT_SECS;
        assert!(validate_config(&app_config).is_ok());

        app_config.download.timeout_secs = MAX_WAIT_SECS + 1;
        assert!(validate_config(&app_config).is_err());
    }

    #[test]
    fn test_invalid_webdriver_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "download:\n  root: /tmp/dl\n");

        let result = resolve_command(Command::Run {
            config_path: Some(config_path),
            overrides: ConfigOverrides::default(),
            webdriver_url: Some("not a url".to_string()),
            headless: true,
            download_timeout_secs: None,
        });
        assert!(matches!(
            result,
            Err(DocFetchError::CliArgumentValidation { details })
                if details.contains("webdriver.server_url")
        ));
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }
}
