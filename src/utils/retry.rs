//! Backoff settings for [`RetryableProvider`](crate::RetryableProvider).

use backon::ExponentialBuilder;
use std::time::Duration;

/// Exponential backoff settings.
///
/// ```rust
/// use sms_rental::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_min_delay(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(10))
///     .with_max_retries(5);
/// assert_eq!(config.max_retries, 5);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// First delay (default: 1 second).
    pub min_delay: Duration,
    /// Delay ceiling (default: 15 seconds).
    pub max_delay: Duration,
    /// Growth factor between attempts (default: 2.0).
    pub factor: f32,
    /// Retries after the first attempt (default: 3).
    pub max_retries: usize,
    /// Randomize delays so parallel pollers do not hit the vendor in lockstep.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(15),
            factor: 2.0,
            max_retries: 3,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Configuration that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Backoff strategy for `backon`.
    pub fn build_strategy(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_retries);

        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}
