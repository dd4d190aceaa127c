//! Exponential backoff schedule
//!
//! Retry `n` (1-based) waits `base * 2^(n-1)`. With the default 300 ms base
//! the first retry waits 300 ms and the second 600 ms.

use std::time::Duration;

/// Largest exponent applied to the base delay
const MAX_SHIFT: u32 = 16;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base_delay: Duration,
    max_retries: u32,
}

impl ExponentialBackoff {
    /// Default delay before the first retry
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(300);

    /// Default number of retries after the initial attempt
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// Create a schedule with the given base delay and retry cap
    #[must_use]
    pub const fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self { base_delay, max_retries }
    }

    /// Delay before the first retry
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Retries allowed after the initial attempt
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether another retry is allowed after `retries_done` retries
    #[must_use]
    pub const fn allows(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Delay before retry number `retry` (1-based). `delay(0)` is zero.
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let shift = (retry - 1).min(MAX_SHIFT);
        self.base_delay.saturating_mul(1u32 << shift)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_DELAY, Self::DEFAULT_MAX_RETRIES)
    }
}
