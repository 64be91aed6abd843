use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Closed interval `[low, high]` that jittered values are drawn from.
///
/// Written in config files as a two-element array, e.g. `[2.0, 4.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[T; 2]", into = "[T; 2]")]
#[serde(bound(
    serialize = "T: Serialize + Copy",
    deserialize = "T: Deserialize<'de> + PartialOrd + Copy + fmt::Display"
))]
pub struct Jitter<T> {
    low: T,
    high: T,
}

impl<T: PartialOrd + Copy + fmt::Display> Jitter<T> {
    pub fn new(low: T, high: T) -> Result<Self, String> {
        if low > high {
            return Err(format!("invalid range [{}, {}]: low exceeds high", low, high));
        }
        Ok(Self { low, high })
    }
}

impl<T: Copy> Jitter<T> {
    pub fn fixed(value: T) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    pub fn low(&self) -> T {
        self.low
    }

    pub fn high(&self) -> T {
        self.high
    }
}

impl<T: PartialOrd + Copy + fmt::Display> TryFrom<[T; 2]> for Jitter<T> {
    type Error = String;

    fn try_from([low, high]: [T; 2]) -> Result<Self, Self::Error> {
        Self::new(low, high)
    }
}

impl<T> From<Jitter<T>> for [T; 2] {
    fn from(range: Jitter<T>) -> Self {
        [range.low, range.high]
    }
}

/// Delay range in seconds.
pub type Seconds = Jitter<f64>;

/// Randomized pacing between browser actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after content appears, before extraction (seconds)
    pub settle: Seconds,

    /// Pause before clicking a found interstitial (seconds)
    pub interstitial: Seconds,

    /// Pause before each scroll pass (seconds)
    pub scroll_interval: Seconds,

    /// Distance of each scroll pass (pixels)
    pub scroll_distance: Jitter<u32>,

    /// Number of scroll passes per iteration on scroll-paginated sites
    pub scroll_passes: Jitter<u32>,

    /// Pause before clicking "next page" on page-paginated sites (seconds)
    pub page_turn: Seconds,

    /// Time spent on an item's detail page before going back (seconds)
    pub detail_dwell: Seconds,

    /// Stop a scroll-paginated task after this many consecutive iterations
    /// without a new item (0 disables)
    pub max_idle_rounds: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            settle: Jitter { low: 3.0, high: 5.0 },
            interstitial: Jitter { low: 1.0, high: 3.0 },
            scroll_interval: Jitter { low: 2.0, high: 4.0 },
            scroll_distance: Jitter { low: 800, high: 1200 },
            scroll_passes: Jitter { low: 1, high: 3 },
            page_turn: Jitter { low: 1.0, high: 3.0 },
            detail_dwell: Jitter { low: 2.0, high: 3.0 },
            max_idle_rounds: 5,
        }
    }
}

impl PacingConfig {
    /// No delays and a single fixed scroll pass. Used by tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            settle: Jitter::fixed(0.0),
            interstitial: Jitter::fixed(0.0),
            scroll_interval: Jitter::fixed(0.0),
            scroll_distance: Jitter::fixed(1000),
            scroll_passes: Jitter::fixed(1),
            page_turn: Jitter::fixed(0.0),
            detail_dwell: Jitter::fixed(0.0),
            ..Default::default()
        }
    }
}

/// Bounds for content waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Override for the site's search-content timeout (seconds)
    pub content_timeout_secs: Option<f64>,

    /// Override for the site's detail-page timeout (seconds)
    pub detail_timeout_secs: Option<f64>,

    /// Interval between presence checks (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            content_timeout_secs: None,
            detail_timeout_secs: None,
            poll_interval_ms: 250,
        }
    }
}

impl WaitConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn content_timeout(&self, site_default: Duration) -> Duration {
        self.content_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(site_default)
    }

    pub fn detail_timeout(&self, site_default: Duration) -> Duration {
        self.detail_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(site_default)
    }
}
