use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Jitter, PacingConfig, Seconds};

/// Draws jittered delays and scroll distances.
///
/// Every call samples afresh; nothing is cached between calls.
pub struct Pacer {
    config: PacingConfig,
    rng: StdRng,
}

/// One scroll pass: wait `pause`, then scroll down `pixels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPass {
    pub pause: Duration,
    pub pixels: u32,
}

impl Pacer {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence, for tests.
    pub fn seeded(config: PacingConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    pub fn delay(&mut self, range: Seconds) -> Duration {
        let (low, high) = (range.low(), range.high());
        let secs = if low < high {
            self.rng.random_range(low..=high)
        } else {
            low
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    pub fn count(&mut self, range: Jitter<u32>) -> u32 {
        let (low, high) = (range.low(), range.high());
        if low < high {
            self.rng.random_range(low..=high)
        } else {
            low
        }
    }

    pub async fn pause(&mut self, range: Seconds) {
        let delay = self.delay(range);
        if !delay.is_zero() {
            tracing::trace!("Pausing {:.2}s", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }

    pub async fn settle(&mut self) {
        self.pause(self.config.settle).await
    }

    pub async fn before_interstitial(&mut self) {
        self.pause(self.config.interstitial).await
    }

    pub async fn before_page_turn(&mut self) {
        self.pause(self.config.page_turn).await
    }

    pub async fn dwell_on_detail(&mut self) {
        self.pause(self.config.detail_dwell).await
    }

    /// A fresh random number of scroll passes with independent pauses and
    /// distances.
    pub fn scroll_plan(&mut self) -> Vec<ScrollPass> {
        let passes = self.count(self.config.scroll_passes);
        (0..passes)
            .map(|_| ScrollPass {
                pause: self.delay(self.config.scroll_interval),
                pixels: self.count(self.config.scroll_distance),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(low: f64, high: f64) -> Seconds {
        Jitter::new(low, high).unwrap()
    }

    #[test]
    fn test_delay_within_bounds() {
        let mut pacer = Pacer::seeded(PacingConfig::default(), 7);
        for _ in 0..200 {
            let d = pacer.delay(range(2.0, 4.0));
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(4));
        }
    }

    #[test]
    fn test_delay_is_not_cached() {
        let mut pacer = Pacer::seeded(PacingConfig::default(), 7);
        let draws: Vec<Duration> = (0..20).map(|_| pacer.delay(range(1.0, 3.0))).collect();
        assert!(draws.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_fixed_range_returns_value() {
        let mut pacer = Pacer::seeded(PacingConfig::default(), 1);
        assert_eq!(pacer.delay(Jitter::fixed(1.5)), Duration::from_millis(1500));
        assert_eq!(pacer.count(Jitter::fixed(900)), 900);
    }

    #[test]
    fn test_negative_delay_clamps_to_zero() {
        let mut pacer = Pacer::seeded(PacingConfig::default(), 1);
        assert_eq!(pacer.delay(Jitter::fixed(-1.0)), Duration::ZERO);
    }

    #[test]
    fn test_scroll_plan_respects_config() {
        let mut pacer = Pacer::seeded(PacingConfig::default(), 42);
        for _ in 0..50 {
            let plan = pacer.scroll_plan();
            assert!((1..=3).contains(&plan.len()));
            for pass in plan {
                assert!((800..=1200).contains(&pass.pixels));
                assert!(pass.pause >= Duration::from_secs(2));
                assert!(pass.pause <= Duration::from_secs(4));
            }
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Pacer::seeded(PacingConfig::default(), 99);
        let mut b = Pacer::seeded(PacingConfig::default(), 99);
        assert_eq!(a.scroll_plan(), b.scroll_plan());
    }

    #[tokio::test]
    async fn test_immediate_config_does_not_sleep() {
        let mut pacer = Pacer::new(PacingConfig::immediate());
        let start = std::time::Instant::now();
        pacer.settle().await;
        pacer.before_page_turn().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
