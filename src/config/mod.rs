//! Configuration management for trawler.
//!
//! Configuration is read from `~/.config/trawler/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod browser;
pub mod pacing;

pub use browser::BrowserConfig;
pub use pacing::{Jitter, PacingConfig, Seconds, WaitConfig};

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub pacing: PacingConfig,
    pub wait: WaitConfig,
    pub output: OutputConfig,
}

/// Where results and per-task logs are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Also write per-task log lines to stderr
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            logs_dir: PathBuf::from("logs"),
            verbose: true,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/trawler/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("trawler").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# trawler configuration
#
# Ranges are written as [low, high]; every value is drawn uniformly from
# its range each time it is used.

[browser]
# Run the browser without a visible window
headless = false

# Seconds to wait for the browser to start
launch_timeout_secs = 20

# Seconds to wait for a single DevTools request
request_timeout_secs = 30

window_width = 1920
window_height = 1080

# Path to Chrome/Chromium (auto-detected when unset)
# executable = "/usr/bin/chromium"

args = [
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-blink-features=AutomationControlled",
]

[pacing]
# Pause after the results render, before reading them (seconds)
settle = [3.0, 5.0]

# Pause before dismissing a cookie/region popup (seconds)
interstitial = [1.0, 3.0]

# Infinite-scroll sites: passes per round, pause before each pass, pixels per pass
scroll_passes = [1, 3]
scroll_interval = [2.0, 4.0]
scroll_distance = [800, 1200]

# Paginated sites: pause before clicking "next page" (seconds)
page_turn = [1.0, 3.0]

# Time spent on an item page when scrape_item_page is set (seconds)
detail_dwell = [2.0, 3.0]

# Give up on an infinite-scroll feed after this many rounds with nothing new (0 = never)
max_idle_rounds = 5

[wait]
# Override the per-site timeouts for content to appear (seconds)
# content_timeout_secs = 8.0
# detail_timeout_secs = 8.0

# How often to check whether content has appeared (milliseconds)
poll_interval_ms = 250

[output]
results_dir = "results"
logs_dir = "logs"

# Mirror per-task log lines to stderr
verbose = true
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
