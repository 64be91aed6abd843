//! Browser automation capability.
//!
//! The engine never talks to a browser directly: it drives a
//! [`BrowserSession`] obtained from a [`BrowserLauncher`], one fresh session
//! per task.
//!
//! ```text
//! TaskRunner → BrowserLauncher::launch → BrowserSession (goto / evaluate / click / back / quit)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use trawler::browser::{BrowserLauncher, ChromeLauncher};
//! use trawler::config::BrowserConfig;
//!
//! let launcher = ChromeLauncher::new(BrowserConfig::headless());
//! let mut session = launcher.launch().await?;
//! session.goto("https://www.mercari.com/search/?keyword=ring").await?;
//! let found = session.is_present("div[data-testid=Search-Items]").await?;
//! session.quit().await?;
//! ```

mod chrome;

pub use chrome::{ChromeLauncher, ChromeSession};

use async_trait::async_trait;
use serde_json::Value;

use crate::app::Result;

/// One live browser with a single tab.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate the tab to `url` and wait for the load to finish.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Whether an element matching `selector` is currently in the DOM.
    async fn is_present(&mut self, selector: &str) -> Result<bool>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Evaluate a JavaScript expression and return its JSON value.
    async fn evaluate(&mut self, script: &str) -> Result<Value>;

    /// Go back one entry in the tab's history.
    async fn back(&mut self) -> Result<()>;

    /// Close the browser. The session must not be used afterwards.
    async fn quit(&mut self) -> Result<()>;

    /// Smoothly scroll the viewport down by `pixels`.
    async fn scroll_by(&mut self, pixels: u32) -> Result<()> {
        self.evaluate(&format!(
            "window.scrollTo({{ top: window.scrollY + {}, left: 0, behavior: 'smooth' }})",
            pixels
        ))
        .await
        .map(|_| ())
    }
}

/// Opens fresh browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// JavaScript expression that is `true` when `selector` matches an element.
pub fn presence_script(selector: &str) -> String {
    // serde_json string encoding doubles as JS string-literal escaping
    let literal = Value::String(selector.to_string()).to_string();
    format!("document.querySelector({}) !== null", literal)
}

#[cfg(test)]
pub(crate) mod fake;
