use crate::config::ScrapingConfig;
use std::time::Duration;

/// Widening factor cap: one supplier can slow itself down at most 8x.
const MAX_WIDEN_FACTOR: u32 = 8;

/// Per-supplier adaptive backpressure state
///
/// Each supplier gets its own pacing state so that slowdowns on one supplier
/// never throttle the others. An HTTP 429 widens the politeness delay window
/// for that supplier's subsequent requests; the factor is scoped to the run
/// and doubles per 429 up to a cap.
#[derive(Debug, Clone)]
pub struct SupplierPacing {
    /// Multiplier applied to the configured delay window
    widen_factor: u32,

    /// Number of 429 responses observed for this supplier
    pub rate_limit_hits: u32,
}

impl SupplierPacing {
    pub fn new() -> Self {
        Self {
            widen_factor: 1,
            rate_limit_hits: 0,
        }
    }

    /// The current politeness delay window, in milliseconds.
    pub fn delay_window(&self, config: &ScrapingConfig) -> (u64, u64) {
        let factor = u64::from(self.widen_factor);
        (config.delay_min_ms * factor, config.delay_max_ms * factor)
    }

    /// Records an HTTP 429 and widens the delay window.
    pub fn record_rate_limit(&mut self) {
        self.rate_limit_hits += 1;
        self.widen_factor = (self.widen_factor * 2).min(MAX_WIDEN_FACTOR);
    }

    /// Draws one politeness delay from the current window.
    pub fn politeness_delay(&self, config: &ScrapingConfig) -> Duration {
        let (min, max) = self.delay_window(config);
        let millis = if max > min {
            rand::Rng::gen_range(&mut rand::thread_rng(), min..=max)
        } else {
            min
        };
        Duration::from_millis(millis)
    }

    pub fn widen_factor(&self) -> u32 {
        self.widen_factor
    }
}

impl Default for SupplierPacing {
    fn default() -> Self {
        Self::new()
    }
}
