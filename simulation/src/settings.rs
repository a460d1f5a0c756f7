//! Setup-time run parameters.

use std::time::Duration;

use log::warn;

/// Pause between ticks when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3_000);
/// Longest accepted pause between ticks.
pub const MAX_DELAY: Duration = Duration::from_millis(60_000);
/// Largest accepted tick limit.
pub const MAX_TICKS_LIMIT: u64 = 10_000;

/// Parameters consumed before the tick loop starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSettings {
    delay: Duration,
    max_ticks: u64,
    start_paused: bool,
    seed: u64,
}

impl RunSettings {
    /// Creates settings with the default delay, no tick limit and seed zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            max_ticks: 0,
            start_paused: false,
            seed: 0,
        }
    }

    /// Sets the inter-tick delay, clamped to [`MAX_DELAY`].
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        if delay > MAX_DELAY {
            warn!("delay {delay:?} exceeds {MAX_DELAY:?}, clamping");
        }
        self.delay = delay.min(MAX_DELAY);
        self
    }

    /// Sets the tick limit, clamped to [`MAX_TICKS_LIMIT`]. Zero means unbounded.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        if max_ticks > MAX_TICKS_LIMIT {
            warn!("tick limit {max_ticks} exceeds {MAX_TICKS_LIMIT}, clamping");
        }
        self.max_ticks = max_ticks.min(MAX_TICKS_LIMIT);
        self
    }

    /// Starts the loop paused so the first tick waits for a step or resume.
    #[must_use]
    pub const fn with_start_paused(mut self, start_paused: bool) -> Self {
        self.start_paused = start_paused;
        self
    }

    /// Seeds the random source shared by initialization and every tick.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Pause between ticks.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Tick limit, zero when unbounded.
    #[must_use]
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether the loop starts paused.
    #[must_use]
    pub const fn start_paused(&self) -> bool {
        self.start_paused
    }

    /// Random seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Reports whether `tick` reached the limit.
    #[must_use]
    pub const fn limit_reached(&self, tick: u64) -> bool {
        self.max_ticks != 0 && tick >= self.max_ticks
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::new()
    }
}
