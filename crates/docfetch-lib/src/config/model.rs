use crate::browser::Locator;
use crate::download::{DEFAULT_PENDING_SUFFIXES, DownloadLayout};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub portal: PortalConfig,
    pub webdriver: WebDriverConfig,
    pub download: DownloadConfig,
    pub identifiers: IdentifiersConfig,
    pub timing: TimingConfig,
    pub selectors: SelectorsConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct PortalConfig {
    /// Page hosting the login form.
    pub login_url: String,
    /// Technical library page with the product search form.
    pub search_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: "https://labcentral.corelaboratory.abbott/int/en/home.html".to_string(),
            search_url:
                "https://labcentral.corelaboratory.abbott/int/vi/secure/technical-library.html#pi_search"
                    .to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct WebDriverConfig {
    pub server_url: String,
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9515".to_string(),
            headless: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DownloadConfig {
    /// Directory the browser saves into; artifacts are organized below it.
    pub root: PathBuf,
    pub layout: DownloadLayout,
    pub pending_suffixes: Vec<String>,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl DownloadConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("downloads"),
            layout: DownloadLayout::default(),
            pending_suffixes: DEFAULT_PENDING_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            poll_interval_ms: 1000,
            timeout_secs: 600,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct IdentifiersConfig {
    pub path: PathBuf,
}

impl Default for IdentifiersConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/list.txt"),
        }
    }
}

/// Element wait budgets and the fixed settling delays between UI actions.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct TimingConfig {
    pub element_wait_secs: u64,
    pub download_button_wait_secs: u64,
    pub continue_dialog_wait_secs: u64,
    pub element_poll_ms: u64,
    pub scroll_settle_ms: u64,
    pub action_settle_ms: u64,
    pub post_login_settle_ms: u64,
    pub inter_item_delay_ms: u64,
}

impl TimingConfig {
    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn download_button_wait(&self) -> Duration {
        Duration::from_secs(self.download_button_wait_secs)
    }

    pub fn continue_dialog_wait(&self) -> Duration {
        Duration::from_secs(self.continue_dialog_wait_secs)
    }

    pub fn element_poll(&self) -> Duration {
        Duration::from_millis(self.element_poll_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn action_settle(&self) -> Duration {
        Duration::from_millis(self.action_settle_ms)
    }

    pub fn post_login_settle(&self) -> Duration {
        Duration::from_millis(self.post_login_settle_ms)
    }

    pub fn inter_item_delay(&self) -> Duration {
        Duration::from_millis(self.inter_item_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            element_wait_secs: 10,
            download_button_wait_secs: 15,
            continue_dialog_wait_secs: 60,
            element_poll_ms: 250,
            scroll_settle_ms: 1000,
            action_settle_ms: 5000,
            post_login_settle_ms: 10000,
            inter_item_delay_ms: 2000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SelectorsConfig {
    pub email_input: Locator,
    pub password_input: Locator,
    pub login_submit: Locator,
    pub search_mode_dropdown: Locator,
    pub search_mode_option: Locator,
    pub search_input: Locator,
    pub search_submit: Locator,
    /// Checkbox of the result row; `{identifier}` is substituted per product.
    pub result_row_checkbox: Locator,
    pub download_selected: Locator,
    pub continue_button: Locator,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            email_input: Locator::xpath("//input[@placeholder='Email Address']"),
            password_input: Locator::xpath("//input[@placeholder='Password']"),
            login_submit: Locator::xpath("//button[@type='submit']"),
            search_mode_dropdown: Locator::xpath(
                "//div[contains(@class, 'react-select__placeholder') and text()='Chọn']/parent::div/parent::div",
            ),
            search_mode_option: Locator::xpath(
                "//div[contains(@class, 'react-select__option') and contains(text(), 'Tìm kiếm chung')]",
            ),
            search_input: Locator::xpath("//input[contains(@placeholder, 'Nhập số đầu dòng…')]"),
            search_submit: Locator::css("button.btn.search-input-submit"),
            result_row_checkbox: Locator::xpath(
                "//tr[td[contains(text(), '{identifier}')]]//span[@class='a-checkbox__custom' and @role='checkbox']",
            ),
            download_selected: Locator::xpath(
                "//button[contains(@class,'btn') and starts-with(normalize-space(),'Tải xuống')]",
            ),
            continue_button: Locator::xpath(
                "//a[contains(@class, 'btn') and contains(., 'TIẾP TỤC')]",
            ),
        }
    }
}
