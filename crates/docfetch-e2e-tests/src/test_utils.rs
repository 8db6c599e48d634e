use async_trait::async_trait;
use docfetch_lib::batch::{BatchController, BatchOptions};
use docfetch_lib::browser::{Browser, Locator, WaitCondition};
use docfetch_lib::config::{Config, SelectorsConfig, TimingConfig};
use docfetch_lib::error::DocFetchError;
use docfetch_lib::session::SessionDriver;
use eyre::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCall {
    Goto(String),
    Wait(Locator),
    Click(Locator),
    Clear(Locator),
    Type(Locator, String),
    Scroll(Locator),
    Quit,
}

#[derive(Debug, Default)]
struct PortalState {
    calls: Vec<BrowserCall>,
    query: Option<String>,
    downloads: usize,
}

/// Read access to what a [`ScriptedBrowser`] was asked to do, usable after the browser has
/// been moved into a session.
#[derive(Debug, Clone, Default)]
pub struct BrowserObserver {
    state: Arc<Mutex<PortalState>>,
}

impl BrowserObserver {
    pub fn calls(&self) -> Vec<BrowserCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Identifiers typed into the search field, in order.
    pub fn searches(&self, selectors: &SelectorsConfig) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BrowserCall::Type(locator, text) if locator == selectors.search_input => {
                    Some(text)
                }
                _ => None,
            })
            .collect()
    }

    pub fn quit_called(&self) -> bool {
        self.calls().contains(&BrowserCall::Quit)
    }
}

#[derive(Debug, Clone)]
pub struct FakeElement(pub Locator);

/// A stand-in portal. Every element is immediately available unless listed as missing, and
/// confirming the continuation dialog drops a vendor-named PDF into the download directory.
pub struct ScriptedBrowser {
    selectors: SelectorsConfig,
    download_dir: PathBuf,
    missing: HashSet<Locator>,
    no_download_for: HashSet<String>,
    leave_partial_files: bool,
    state: Arc<Mutex<PortalState>>,
}

impl ScriptedBrowser {
    pub fn new(download_dir: impl Into<PathBuf>, selectors: SelectorsConfig) -> Self {
        Self {
            selectors,
            download_dir: download_dir.into(),
            missing: HashSet::new(),
            no_download_for: HashSet::new(),
            leave_partial_files: false,
            state: Arc::default(),
        }
    }

    pub fn with_missing(mut self, locator: Locator) -> Self {
        self.missing.insert(locator);
        self
    }

    /// The result row for `identifier` never shows up.
    pub fn without_result_for(self, identifier: &str) -> Self {
        let row = self.selectors.result_row_checkbox.with_identifier(identifier);
        self.with_missing(row)
    }

    /// The UI sequence for `identifier` succeeds but no file ever arrives.
    pub fn stalling_download_for(mut self, identifier: &str) -> Self {
        self.no_download_for.insert(identifier.to_string());
        self
    }

    /// Each download also leaves an abandoned `.crdownload` file behind.
    pub fn leaving_partial_files(mut self) -> Self {
        self.leave_partial_files = true;
        self
    }

    pub fn observer(&self) -> BrowserObserver {
        BrowserObserver {
            state: self.state.clone(),
        }
    }

    fn record(&self, call: BrowserCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn deliver_download(&self) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(query) = state.query.clone() else {
            return Ok(());
        };
        if self.no_download_for.contains(&query) {
            return Ok(());
        }

        state.downloads += 1;
        let n = state.downloads;
        if self.leave_partial_files {
            std::fs::write(
                self.download_dir.join(format!("Unconfirmed {n}.crdownload")),
                b"partial",
            )?;
        }
        std::fs::write(
            self.download_dir.join(format!("IFU_{n:04}_vendor.pdf")),
            format!("pdf for {query}"),
        )
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    type Element = FakeElement;

    async fn goto(&mut self, url: &str) -> Result<(), DocFetchError> {
        self.record(BrowserCall::Goto(url.to_string()));
        Ok(())
    }

    async fn wait_for(
        &mut self,
        locator: &Locator,
        _condition: WaitCondition,
        timeout: Duration,
    ) -> Result<FakeElement, DocFetchError> {
        self.record(BrowserCall::Wait(locator.clone()));
        if self.missing.contains(locator) {
            return Err(DocFetchError::ElementWait {
                locator: locator.to_string(),
                timeout,
            });
        }
        Ok(FakeElement(locator.clone()))
    }

    async fn click(&mut self, element: &FakeElement) -> Result<(), DocFetchError> {
        self.record(BrowserCall::Click(element.0.clone()));
        if element.0 == self.selectors.continue_button {
            self.deliver_download()?;
        }
        Ok(())
    }

    async fn clear(&mut self, element: &FakeElement) -> Result<(), DocFetchError> {
        self.record(BrowserCall::Clear(element.0.clone()));
        Ok(())
    }

    async fn type_text(&mut self, element: &FakeElement, text: &str) -> Result<(), DocFetchError> {
        self.record(BrowserCall::Type(element.0.clone(), text.to_string()));
        if element.0 == self.selectors.search_input {
            self.state.lock().unwrap().query = Some(text.to_string());
        }
        Ok(())
    }

    async fn scroll_into_view(&mut self, element: &FakeElement) -> Result<(), DocFetchError> {
        self.record(BrowserCall::Scroll(element.0.clone()));
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), DocFetchError> {
        self.record(BrowserCall::Quit);
        Ok(())
    }
}

/// Config pointing at `root`, with every settling delay removed and short waits.
pub fn create_test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.download.root = root.join("downloads");
    config.download.poll_interval_ms = 20;
    config.download.timeout_secs = 1;
    config.identifiers.path = root.join("list.txt");
    config.timing = TimingConfig {
        scroll_settle_ms: 0,
        action_settle_ms: 0,
        post_login_settle_ms: 0,
        inter_item_delay_ms: 0,
        ..TimingConfig::default()
    };
    config
}

/// Temp dir holding `list.txt` with `identifiers` and an empty `downloads/` folder.
pub fn setup_test_environment(identifiers: &[&str]) -> Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;

    let config = create_test_config(temp_dir.path());
    std::fs::create_dir_all(&config.download.root)?;
    std::fs::write(&config.identifiers.path, identifiers.join("\n"))?;

    Ok(temp_dir)
}

pub fn build_controller(
    config: &Config,
    browser: ScriptedBrowser,
) -> BatchController<ScriptedBrowser> {
    let session = SessionDriver::new(
        browser,
        config.portal.clone(),
        config.selectors.clone(),
        config.timing.clone(),
    );
    let options = BatchOptions::from_config(
        config.download.root.clone(),
        &config.download,
        &config.timing,
    );
    BatchController::new(session, options)
}
