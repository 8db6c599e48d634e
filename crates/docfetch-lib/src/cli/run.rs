use crate::batch::{BatchController, BatchOptions, BatchReport};
use crate::browser::WebDriverBrowser;
use crate::cli::RunParams;
use crate::error::DocFetchError;
use crate::identifiers::load_identifiers;
use crate::session::SessionDriver;

pub async fn run_batch(params: RunParams) -> Result<BatchReport, DocFetchError> {
    let RunParams {
        app_config,
        credentials,
    } = params;

    let identifiers = load_identifiers(&app_config.identifiers.path).await?;

    tokio::fs::create_dir_all(&app_config.download.root).await?;
    // Chrome only honours an absolute download directory.
    let download_root = tokio::fs::canonicalize(&app_config.download.root).await?;
    tracing::info!("Base download folder: {}", download_root.display());

    let browser = WebDriverBrowser::connect(
        &app_config.webdriver,
        &download_root,
        app_config.timing.element_poll(),
    )
    .await?;

    let session = SessionDriver::new(
        browser,
        app_config.portal.clone(),
        app_config.selectors.clone(),
        app_config.timing.clone(),
    );
    let options =
        BatchOptions::from_config(download_root, &app_config.download, &app_config.timing);

    let report = BatchController::new(session, options)
        .run(&identifiers, &credentials)
        .await?;

    tracing::info!("Automation complete.");
    Ok(report)
}
