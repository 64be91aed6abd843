use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::app::{Result, TrawlerError};
use crate::browser::{presence_script, BrowserLauncher, BrowserSession};
use crate::config::BrowserConfig;

/// Launches a fresh Chrome/Chromium process per session using chromiumoxide
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn cdp_config(&self) -> Result<CdpBrowserConfig> {
        let mut builder = CdpBrowserConfig::builder()
            .no_sandbox()
            .window_size(self.config.window_width, self.config.window_height)
            .launch_timeout(self.config.launch_timeout())
            .request_timeout(self.config.request_timeout());

        for arg in &self.config.args {
            builder = builder.arg(arg.as_str());
        }

        if let Some(ref path) = self.config.executable {
            builder = builder.chrome_executable(path);
        }

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| TrawlerError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let (browser, mut handler) = Browser::launch(self.cdp_config()?)
            .await
            .map_err(|e| {
                TrawlerError::Browser(format!(
                    "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                    e
                ))
            })?;

        // Drive the CDP connection until the browser goes away
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| TrawlerError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| TrawlerError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        tracing::debug!("Browser launched");

        Ok(Box::new(ChromeSession {
            browser,
            page,
            handler,
            closed: false,
        }))
    }
}

/// A single-tab Chrome session
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| TrawlerError::Browser(format!("Navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn is_present(&mut self, selector: &str) -> Result<bool> {
        let found = self.evaluate(&presence_script(selector)).await?;
        Ok(found.as_bool().unwrap_or(false))
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| TrawlerError::Browser(format!("Element {} not found: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| TrawlerError::Browser(format!("Click on {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        let result = self
            .page
            .evaluate(script.to_string())
            .await
            .map_err(|e| TrawlerError::Browser(format!("Script execution failed: {}", e)))?;

        // Statements such as `history.back()` evaluate to undefined
        Ok(result.into_value::<Value>().unwrap_or(Value::Null))
    }

    async fn back(&mut self) -> Result<()> {
        self.evaluate("window.history.back()").await?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| TrawlerError::Browser(format!("Navigation back failed: {}", e)))?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| TrawlerError::Browser(format!("Failed to close browser: {}", e)));
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed.map(|_| ())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if !self.closed {
            // Browser::drop kills the child process; stop the event loop too
            self.handler.abort();
        }
    }
}
