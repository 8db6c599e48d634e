use super::{Browser, Locator, WaitCondition};
use crate::config::WebDriverConfig;
use crate::error::DocFetchError;
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use thirtyfour::ChromiumLikeCapabilities;
use thirtyfour::prelude::*;

const SCROLL_INTO_VIEW_SCRIPT: &str =
    "arguments[0].scrollIntoView({behavior: 'smooth', block: 'center'});";

/// Chrome driven over the W3C WebDriver protocol (chromedriver or a Selenium grid).
pub struct WebDriverBrowser {
    driver: WebDriver,
    poll_interval: Duration,
}

impl WebDriverBrowser {
    /// Starts a Chrome session that saves downloads into `download_dir` without prompting.
    /// `download_dir` must be absolute.
    pub async fn connect(
        config: &WebDriverConfig,
        download_dir: &Path,
        poll_interval: Duration,
    ) -> Result<Self, DocFetchError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_experimental_option(
            "prefs",
            json!({
                "download.default_directory": download_dir.to_string_lossy(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
                "safebrowsing.enabled": true,
            }),
        )
        .map_err(DocFetchError::browser("configure download preferences"))?;
        if config.headless {
            caps.set_headless()
                .map_err(DocFetchError::browser("enable headless mode"))?;
        }

        tracing::info!(
            server = %config.server_url,
            headless = config.headless,
            download_dir = %download_dir.display(),
            "Starting browser session"
        );
        let driver = WebDriver::new(config.server_url.as_str(), caps)
            .await
            .map_err(DocFetchError::browser("start session"))?;

        Ok(Self {
            driver,
            poll_interval,
        })
    }

    fn by(locator: &Locator) -> By {
        match locator {
            Locator::XPath(expression) => By::XPath(expression.as_str()),
            Locator::Css(selector) => By::Css(selector.as_str()),
        }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = WebElement;

    async fn goto(&mut self, url: &str) -> Result<(), DocFetchError> {
        self.driver
            .goto(url)
            .await
            .map_err(DocFetchError::browser(format!("navigate to {}", url)))
    }

    async fn wait_for(
        &mut self,
        locator: &Locator,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<WebElement, DocFetchError> {
        let query = self
            .driver
            .query(Self::by(locator))
            .wait(timeout, self.poll_interval);
        let query = match condition {
            WaitCondition::Present => query,
            WaitCondition::Clickable => query.and_clickable(),
        };

        query.first().await.map_err(|e| {
            tracing::debug!(locator = %locator, error = %e, "Element wait failed");
            DocFetchError::ElementWait {
                locator: locator.to_string(),
                timeout,
            }
        })
    }

    async fn click(&mut self, element: &WebElement) -> Result<(), DocFetchError> {
        element
            .click()
            .await
            .map_err(DocFetchError::browser("click"))
    }

    async fn clear(&mut self, element: &WebElement) -> Result<(), DocFetchError> {
        element
            .clear()
            .await
            .map_err(DocFetchError::browser("clear"))
    }

    async fn type_text(&mut self, element: &WebElement, text: &str) -> Result<(), DocFetchError> {
        element
            .send_keys(text)
            .await
            .map_err(DocFetchError::browser("type text"))
    }

    async fn scroll_into_view(&mut self, element: &WebElement) -> Result<(), DocFetchError> {
        let argument = element
            .to_json()
            .map_err(DocFetchError::browser("serialize element"))?;
        self.driver
            .execute(SCROLL_INTO_VIEW_SCRIPT, vec![argument])
            .await
            .map_err(DocFetchError::browser("scroll into view"))?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), DocFetchError> {
        tracing::info!("Closing browser session");
        self.driver
            .clone()
            .quit()
            .await
            .map_err(DocFetchError::browser("quit"))
    }
}
