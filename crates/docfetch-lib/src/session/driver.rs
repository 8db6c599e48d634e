use super::state::DownloadStep;
use crate::browser::{Browser, Locator, WaitCondition};
use crate::config::{Credentials, PortalConfig, SelectorsConfig, TimingConfig};
use crate::error::DocFetchError;
use crate::identifiers::Identifier;
use std::time::Duration;
use tracing::instrument;

async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

async fn click_when_clickable<B: Browser>(
    browser: &mut B,
    locator: &Locator,
    timeout: Duration,
) -> Result<(), DocFetchError> {
    let element = browser
        .wait_for(locator, WaitCondition::Clickable, timeout)
        .await?;
    browser.click(&element).await
}

/// Scrolls the element to the middle of the viewport first, so sticky headers and overlays do
/// not intercept the click.
async fn scroll_and_click<B: Browser>(
    browser: &mut B,
    locator: &Locator,
    timeout: Duration,
    scroll_settle: Duration,
) -> Result<(), DocFetchError> {
    let element = browser
        .wait_for(locator, WaitCondition::Clickable, timeout)
        .await?;
    browser.scroll_into_view(&element).await?;
    settle(scroll_settle).await;
    browser.click(&element).await
}

/// One authenticated portal session, reused for every identifier of a batch.
pub struct SessionDriver<B: Browser> {
    browser: B,
    portal: PortalConfig,
    selectors: SelectorsConfig,
    timing: TimingConfig,
}

impl<B: Browser> SessionDriver<B> {
    pub fn new(
        browser: B,
        portal: PortalConfig,
        selectors: SelectorsConfig,
        timing: TimingConfig,
    ) -> Self {
        Self {
            browser,
            portal,
            selectors,
            timing,
        }
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    #[instrument(level = "debug", skip_all, fields(account = %credentials.account))]
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), DocFetchError> {
        tracing::info!("Logging in to {}", self.portal.login_url);
        self.login_sequence(credentials)
            .await
            .map_err(|e| DocFetchError::Login {
                reason: e.to_string(),
            })?;
        tracing::info!("Login submitted");
        Ok(())
    }

    async fn login_sequence(&mut self, credentials: &Credentials) -> Result<(), DocFetchError> {
        let Self {
            browser,
            portal,
            selectors,
            timing,
        } = self;

        browser.goto(&portal.login_url).await?;

        let email = browser
            .wait_for(
                &selectors.email_input,
                WaitCondition::Present,
                timing.element_wait(),
            )
            .await?;
        browser.type_text(&email, &credentials.account).await?;

        let password = browser
            .wait_for(
                &selectors.password_input,
                WaitCondition::Present,
                timing.element_wait(),
            )
            .await?;
        browser.type_text(&password, &credentials.secret).await?;
        settle(timing.action_settle()).await;

        scroll_and_click(
            browser,
            &selectors.login_submit,
            timing.element_wait(),
            timing.scroll_settle(),
        )
        .await?;

        // The portal redirects through its identity provider before the session cookie is usable.
        settle(timing.post_login_settle()).await;
        Ok(())
    }

    /// Opens the technical library and switches the search form to the general search mode.
    #[instrument(level = "debug", skip_all)]
    pub async fn open_search_view(&mut self) -> Result<(), DocFetchError> {
        tracing::info!("Opening search view at {}", self.portal.search_url);
        self.search_view_sequence()
            .await
            .map_err(|e| DocFetchError::Navigation {
                reason: e.to_string(),
            })
    }

    async fn search_view_sequence(&mut self) -> Result<(), DocFetchError> {
        let Self {
            browser,
            portal,
            selectors,
            timing,
        } = self;

        browser.goto(&portal.search_url).await?;
        settle(timing.action_settle()).await;

        click_when_clickable(
            browser,
            &selectors.search_mode_dropdown,
            timing.element_wait(),
        )
        .await?;
        settle(timing.action_settle()).await;

        click_when_clickable(browser, &selectors.search_mode_option, timing.element_wait())
            .await?;
        settle(timing.action_settle()).await;
        Ok(())
    }

    /// Drives the search form from [`DownloadStep::Idle`] to
    /// [`DownloadStep::TransferTriggered`]. A failed step aborts this identifier only; the
    /// session stays usable.
    #[instrument(level = "debug", skip_all, fields(identifier = %identifier))]
    pub async fn search_and_request_download(
        &mut self,
        identifier: &Identifier,
    ) -> Result<(), DocFetchError> {
        let mut state = DownloadStep::Idle;
        while let Some(next) = state.next() {
            self.enter(identifier, next)
                .await
                .map_err(|e| DocFetchError::NoResultOrUiError {
                    identifier: identifier.to_string(),
                    state: next,
                    reason: e.to_string(),
                })?;
            tracing::trace!(identifier = %identifier, state = %next, "UI step completed");
            state = next;
        }
        Ok(())
    }

    async fn enter(
        &mut self,
        identifier: &Identifier,
        step: DownloadStep,
    ) -> Result<(), DocFetchError> {
        let Self {
            browser,
            selectors,
            timing,
            ..
        } = self;

        match step {
            DownloadStep::Idle => {}
            DownloadStep::Searched => {
                let field = browser
                    .wait_for(
                        &selectors.search_input,
                        WaitCondition::Present,
                        timing.element_wait(),
                    )
                    .await?;
                browser.clear(&field).await?;
                browser.type_text(&field, identifier.as_str()).await?;

                scroll_and_click(
                    browser,
                    &selectors.search_submit,
                    timing.element_wait(),
                    timing.scroll_settle(),
                )
                .await?;
                settle(timing.action_settle()).await;
            }
            DownloadStep::RowSelected => {
                let checkbox = selectors
                    .result_row_checkbox
                    .with_identifier(identifier.as_str());
                scroll_and_click(
                    browser,
                    &checkbox,
                    timing.element_wait(),
                    timing.scroll_settle(),
                )
                .await?;
                settle(timing.action_settle()).await;
            }
            DownloadStep::DownloadRequested => {
                scroll_and_click(
                    browser,
                    &selectors.download_selected,
                    timing.download_button_wait(),
                    timing.scroll_settle(),
                )
                .await?;
                settle(timing.action_settle()).await;
            }
            DownloadStep::ContinuationConfirmed => {
                scroll_and_click(
                    browser,
                    &selectors.continue_button,
                    timing.continue_dialog_wait(),
                    timing.scroll_settle(),
                )
                .await?;
            }
            // Confirming the dialog is what starts the transfer; the file shows up in the
            // download directory, not on the page.
            DownloadStep::TransferTriggered => {}
        }
        Ok(())
    }

    /// Ends the browser session.
    pub async fn shutdown(mut self) -> Result<(), DocFetchError> {
        self.browser.quit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Goto(String),
        Wait(Locator),
        Click(Locator),
        Clear(Locator),
        Type(Locator, String),
        Scroll(Locator),
        Quit,
    }

    #[derive(Default)]
    struct RecordingBrowser {
        calls: Vec<Call>,
        missing: HashSet<Locator>,
        // Outlives the browser, which `shutdown` consumes.
        quits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Browser for RecordingBrowser {
        type Element = Locator;

        async fn goto(&mut self, url: &str) -> Result<(), DocFetchError> {
            self.calls.push(Call::Goto(url.to_string()));
            Ok(())
        }

        async fn wait_for(
            &mut self,
            locator: &Locator,
            _condition: WaitCondition,
            timeout: Duration,
        ) -> Result<Locator, DocFetchError> {
            self.calls.push(Call::Wait(locator.clone()));
            if self.missing.contains(locator) {
                return Err(DocFetchError::ElementWait {
                    locator: locator.to_string(),
                    timeout,
                });
            }
            Ok(locator.clone())
        }

        async fn click(&mut self, element: &Locator) -> Result<(), DocFetchError> {
            self.calls.push(Call::Click(element.clone()));
            Ok(())
        }

        async fn clear(&mut self, element: &Locator) -> Result<(), DocFetchError> {
            self.calls.push(Call::Clear(element.clone()));
            Ok(())
        }

        async fn type_text(&mut self, element: &Locator, text: &str) -> Result<(), DocFetchError> {
            self.calls.push(Call::Type(element.clone(), text.to_string()));
            Ok(())
        }

        async fn scroll_into_view(&mut self, element: &Locator) -> Result<(), DocFetchError> {
            self.calls.push(Call::Scroll(element.clone()));
            Ok(())
        }

        async fn quit(&mut self) -> Result<(), DocFetchError> {
            self.calls.push(Call::Quit);
            self.quits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn instant_timing() -> TimingConfig {
        TimingConfig {
            scroll_settle_ms: 0,
            action_settle_ms: 0,
            post_login_settle_ms: 0,
            inter_item_delay_ms: 0,
            ..TimingConfig::default()
        }
    }

    fn driver(browser: RecordingBrowser) -> SessionDriver<RecordingBrowser> {
        SessionDriver::new(
            browser,
            PortalConfig::default(),
            SelectorsConfig::default(),
            instant_timing(),
        )
    }

    fn id(value: &str) -> Identifier {
        Identifier::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_login_types_credentials_and_submits() {
        let mut session = driver(RecordingBrowser::default());
        session
            .login(&Credentials::new("ops@example.com", "s3cret"))
            .await
            .unwrap();

        let selectors = SelectorsConfig::default();
        let calls = &session.browser().calls;
        assert_eq!(calls[0], Call::Goto(PortalConfig::default().login_url));
        assert!(calls.contains(&Call::Type(
            selectors.email_input.clone(),
            "ops@example.com".to_string()
        )));
        assert!(calls.contains(&Call::Type(
            selectors.password_input.clone(),
            "s3cret".to_string()
        )));
        assert_eq!(calls.last(), Some(&Call::Click(selectors.login_submit)));
    }

    #[tokio::test]
    async fn test_login_failure_is_reported_as_login_error() {
        let selectors = SelectorsConfig::default();
        let browser = RecordingBrowser {
            missing: HashSet::from([selectors.password_input.clone()]),
            ..Default::default()
        };
        let mut session = driver(browser);

        let err = session
            .login(&Credentials::new("ops@example.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, DocFetchError::Login { .. }));
    }

    #[tokio::test]
    async fn test_open_search_view_selects_search_mode() {
        let mut session = driver(RecordingBrowser::default());
        session.open_search_view().await.unwrap();

        let selectors = SelectorsConfig::default();
        let clicks: Vec<&Call> = session
            .browser()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Click(_)))
            .collect();
        assert_eq!(
            clicks,
            vec![
                &Call::Click(selectors.search_mode_dropdown),
                &Call::Click(selectors.search_mode_option),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_search_mode_is_a_navigation_error() {
        let selectors = SelectorsConfig::default();
        let browser = RecordingBrowser {
            missing: HashSet::from([selectors.search_mode_option.clone()]),
            ..Default::default()
        };
        let mut session = driver(browser);

        let err = session.open_search_view().await.unwrap_err();
        assert!(matches!(err, DocFetchError::Navigation { .. }));
    }

    #[tokio::test]
    async fn test_download_sequence_clicks_in_order() {
        let mut session = driver(RecordingBrowser::default());
        session
            .search_and_request_download(&id("1001"))
            .await
            .unwrap();

        let selectors = SelectorsConfig::default();
        let calls = &session.browser().calls;
        assert!(calls.contains(&Call::Clear(selectors.search_input.clone())));
        assert!(calls.contains(&Call::Type(
            selectors.search_input.clone(),
            "1001".to_string()
        )));

        let clicks: Vec<Locator> = calls
            .iter()
            .filter_map(|call| match call {
                Call::Click(locator) => Some(locator.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            clicks,
            vec![
                selectors.search_submit,
                selectors.result_row_checkbox.with_identifier("1001"),
                selectors.download_selected,
                selectors.continue_button,
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_result_row_aborts_at_row_selection() {
        let selectors = SelectorsConfig::default();
        let browser = RecordingBrowser {
            missing: HashSet::from([selectors.result_row_checkbox.with_identifier("404")]),
            ..Default::default()
        };
        let mut session = driver(browser);

        let err = session
            .search_and_request_download(&id("404"))
            .await
            .unwrap_err();
        match err {
            DocFetchError::NoResultOrUiError {
                identifier, state, ..
            } => {
                assert_eq!(identifier, "404");
                assert_eq!(state, DownloadStep::RowSelected);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(
            !session
                .browser()
                .calls
                .contains(&Call::Click(selectors.download_selected.clone())),
            "the sequence must stop at the failing step"
        );

        session
            .search_and_request_download(&id("1001"))
            .await
            .expect("the session stays usable after a per-item failure");
    }

    #[tokio::test]
    async fn test_shutdown_quits_browser() {
        let browser = RecordingBrowser::default();
        let quits = browser.quits.clone();
        let session = driver(browser);
        assert_eq!(quits.load(Ordering::SeqCst), 0);

        session.shutdown().await.unwrap();
        assert_eq!(quits.load(Ordering::SeqCst), 1);
    }
}
