mod webdriver;

use crate::error::DocFetchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub use webdriver::WebDriverBrowser;

pub const IDENTIFIER_PLACEHOLDER: &str = "{identifier}";

/// How to find an element on the page.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn expression(&self) -> &str {
        match self {
            Locator::XPath(expression) | Locator::Css(expression) => expression,
        }
    }

    /// Substitutes every `{identifier}` in the expression.
    pub fn with_identifier(&self, identifier: &str) -> Self {
        match self {
            Locator::XPath(expression) => {
                Locator::XPath(expression.replace(IDENTIFIER_PLACEHOLDER, identifier))
            }
            Locator::Css(selector) => {
                Locator::Css(selector.replace(IDENTIFIER_PLACEHOLDER, identifier))
            }
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::XPath(expression) => write!(f, "xpath:{}", expression),
            Locator::Css(selector) => write!(f, "css:{}", selector),
        }
    }
}

/// What an element must satisfy before a wait succeeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitCondition {
    Present,
    Clickable,
}

/// The browser capabilities the session driver needs. Every element lookup is a bounded
/// polling wait; there is no unbounded find.
#[async_trait]
pub trait Browser: Send {
    type Element: Send + Sync;

    async fn goto(&mut self, url: &str) -> Result<(), DocFetchError>;

    /// Polls until `locator` matches an element satisfying `condition`, failing with
    /// [`DocFetchError::ElementWait`] once `timeout` elapses.
    async fn wait_for(
        &mut self,
        locator: &Locator,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<Self::Element, DocFetchError>;

    async fn click(&mut self, element: &Self::Element) -> Result<(), DocFetchError>;

    async fn clear(&mut self, element: &Self::Element) -> Result<(), DocFetchError>;

    async fn type_text(&mut self, element: &Self::Element, text: &str)
    -> Result<(), DocFetchError>;

    async fn scroll_into_view(&mut self, element: &Self::Element) -> Result<(), DocFetchError>;

    /// Ends the browser session. Called once, at the end of a batch.
    async fn quit(&mut self) -> Result<(), DocFetchError>;
}
