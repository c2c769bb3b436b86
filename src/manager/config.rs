//! Manager configuration types.

use crate::errors::{ConfigError, SmsError};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Rental length used when the caller does not give one.
pub(crate) const DEFAULT_RENT_HOURS: u32 = 4;

/// Configuration for [`SmsManager`](crate::SmsManager).
///
/// Controls the defaults used by
/// [`wait_for_code_with_defaults`](crate::SmsManager::wait_for_code_with_defaults)
/// and by rentals that do not name a duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// How long to wait for a code.
    pub timeout: Duration,
    /// Pause between checks.
    pub poll_interval: Duration,
    /// Rental length requested when the caller gives none.
    pub rent_duration_hours: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            rent_duration_hours: DEFAULT_RENT_HOURS,
        }
    }
}

impl ManagerConfig {
    /// Create a new builder for ManagerConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sms_rental::ManagerConfig;
    /// use std::time::Duration;
    ///
    /// let config = ManagerConfig::builder()
    ///     .timeout(Duration::from_secs(180))
    ///     .poll_interval(Duration::from_secs(3))
    ///     .rent_duration_hours(2)
    ///     .build();
    ///
    /// assert_eq!(config.timeout, Duration::from_secs(180));
    /// assert_eq!(config.rent_duration_hours, 2);
    /// ```
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }

    /// Short waits with frequent checks.
    pub fn fast() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Same as [`Default`].
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Long waits for slow services, checked less often.
    pub fn patient() -> Self {
        Self {
            timeout: Duration::from_secs(900),
            poll_interval: Duration::from_secs(10),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_rent_duration_hours(mut self, hours: u32) -> Self {
        self.rent_duration_hours = hours;
        self
    }

    /// Reject settings the polling loop cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl From<ConfigError> for SmsError {
    fn from(err: ConfigError) -> Self {
        SmsError::Other(err.to_string())
    }
}

/// Builder for ManagerConfig.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default: 300 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Default: 5 seconds
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Default: 4 hours
    pub fn rent_duration_hours(mut self, hours: u32) -> Self {
        self.config.rent_duration_hours = hours;
        self
    }

    pub fn build(self) -> ManagerConfig {
        self.config
    }
}
