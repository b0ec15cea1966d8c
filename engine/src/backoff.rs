//! Exponential backoff between retries of the same model.

use std::time::Duration;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(4);

/// Default ceiling for a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Maps an attempt number to the wait before the next attempt.
///
/// `delay(n) = base_delay * 2^(n - 1)`, clamped to `max_delay` when one is set.
/// No jitter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_delay: Option<Duration>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: Some(DEFAULT_MAX_DELAY),
        }
    }
}

impl BackoffPolicy {
    /// Creates an uncapped policy with the given base delay.
    #[must_use]
    pub const fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay: None,
        }
    }

    /// Caps every delay at `max_delay`.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Removes the delay ceiling.
    #[must_use]
    pub const fn without_cap(mut self) -> Self {
        self.max_delay = None;
        self
    }

    /// Delay before the first retry.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Ceiling applied to every delay, if any.
    #[must_use]
    pub const fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Wait owed after failed attempt `attempt_number` (1-indexed).
    ///
    /// Attempt 0 is treated as attempt 1. Growth saturates instead of overflowing.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use quizgen_engine::BackoffPolicy;
    ///
    /// let policy = BackoffPolicy::default();
    /// assert_eq!(policy.delay(1), Duration::from_secs(4));
    /// assert_eq!(policy.delay(3), Duration::from_secs(16));
    /// ```
    #[must_use]
    pub fn delay(&self, attempt_number: usize) -> Duration {
        let exponent = u32::try_from(attempt_number.saturating_sub(1)).unwrap_or(u32::MAX);
        let factor = 2_u32.checked_pow(exponent).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        self.max_delay.map_or(delay, |cap| delay.min(cap))
    }
}
