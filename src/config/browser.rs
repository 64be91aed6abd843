use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the automated browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Whether to run the browser without a visible window (default: false)
    pub headless: bool,

    /// Browser launch timeout in seconds (default: 20)
    pub launch_timeout_secs: u64,

    /// Timeout for a single DevTools request in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Window width in pixels (default: 1920)
    pub window_width: u32,

    /// Window height in pixels (default: 1080)
    pub window_height: u32,

    /// Path to the Chrome/Chromium executable; auto-detected when unset
    pub executable: Option<PathBuf>,

    /// Extra command line switches passed to the browser
    pub args: Vec<String>,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            launch_timeout_secs: 20,
            request_timeout_secs: 30,
            window_width: 1920,
            window_height: 1080,
            executable: None,
            args: vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
            ],
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl BrowserConfig {
    /// Get the launch timeout as a Duration
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    /// Get the DevTools request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Create a config for unattended runs
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = BrowserConfig::default();
        assert!(!config.headless);
        assert_eq!(config.launch_timeout_secs, 20);
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 1080);
        assert!(config.executable.is_none());
        assert!(config.user_agent.is_some());
    }

    #[test]
    fn test_headless_config() {
        let config = BrowserConfig::headless();
        assert!(config.headless);
        // Inherits defaults for the rest
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_timeout_durations() {
        let config = BrowserConfig::default();
        assert_eq!(config.launch_timeout(), Duration::from_secs(20));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
