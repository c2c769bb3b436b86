//! Retryable provider wrapper.

use super::traits::SmsProvider;
use crate::errors::{Result, RetryableError, SmsError};
use crate::order::Order;
use crate::types::{OrderId, ProviderKind};
use crate::utils::retry::RetryConfig;
use backon::Retryable;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Callback type for retry notifications.
///
/// Receives the error that caused the retry and the delay before the next
/// attempt.
pub type OnRetryCallback = Arc<dyn Fn(&SmsError, Duration) + Send + Sync>;

/// Wrapper that adds automatic retry logic to any [`SmsProvider`].
///
/// Balance queries and message checks are retried while the error reports
/// [`RetryableError::is_retryable`]. Rentals are retried only on
/// [`SmsError::is_retryable_rent`]: a buy request that timed out or hit a 5xx
/// may still have rented and charged for a number. Cancellation is passed
/// through once.
///
/// Nothing installs this wrapper implicitly; wrap a provider and hand it to
/// [`SmsManager::with_provider`](crate::SmsManager::with_provider).
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::{AnyProvider, ProviderKind, RetryConfig, RetryableProvider};
/// use std::time::Duration;
///
/// let base = AnyProvider::new(ProviderKind::FiveSim, "api_key")?;
/// let provider = RetryableProvider::with_config(
///     base,
///     RetryConfig::default().with_max_retries(5),
/// )
/// .with_on_retry(|error, delay| eprintln!("retrying in {delay:?}: {error}"));
/// ```
pub struct RetryableProvider<P: SmsProvider> {
    inner: Arc<P>,
    retry_config: RetryConfig,
    on_retry: Option<OnRetryCallback>,
}

impl<P: SmsProvider> Clone for RetryableProvider<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            retry_config: self.retry_config.clone(),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<P: SmsProvider + Debug> Debug for RetryableProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryableProvider")
            .field("inner", &self.inner)
            .field("retry_config", &self.retry_config)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "..."))
            .finish()
    }
}

impl<P: SmsProvider> RetryableProvider<P> {
    /// Wrap a provider with default retry logic.
    pub fn new(inner: P) -> Self {
        Self::with_config(inner, RetryConfig::default())
    }

    /// Wrap a provider with custom retry configuration.
    pub fn with_config(inner: P, retry_config: RetryConfig) -> Self {
        Self {
            inner: Arc::new(inner),
            retry_config,
            on_retry: None,
        }
    }

    /// Set a callback to be invoked on each retry attempt.
    pub fn with_on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SmsError, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    /// Get reference to the inner provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get reference to the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    fn notifier(&self, operation: &'static str) -> impl Fn(&SmsError, Duration) + use<P> {
        let on_retry = self.on_retry.clone();
        move |err, duration| {
            if let Some(ref callback) = on_retry {
                callback(err, duration);
            }

            #[cfg(feature = "tracing")]
            debug!(
                error = %err,
                operation,
                retry_after_secs = %duration.as_secs_f64(),
                "Retrying provider call"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = operation;
        }
    }
}

impl<P: SmsProvider> SmsProvider for RetryableProvider<P> {
    fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "RetryableProvider::get_balance", skip_all)
    )]
    async fn get_balance(&self) -> Result<f64> {
        let inner = Arc::clone(&self.inner);
        (|| {
            let inner = Arc::clone(&inner);
            async move { inner.get_balance().await }
        })
        .retry(self.retry_config.build_strategy())
        .when(|err: &SmsError| err.is_retryable())
        .notify(self.notifier("get_balance"))
        .await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "RetryableProvider::rent_number",
            skip_all,
            fields(country = %country, service = %service)
        )
    )]
    async fn rent_number(
        &self,
        country: &str,
        service: &str,
        duration_hours: Option<u32>,
    ) -> Result<Order> {
        let inner = Arc::clone(&self.inner);
        (|| {
            let inner = Arc::clone(&inner);
            async move { inner.rent_number(country, service, duration_hours).await }
        })
        .retry(self.retry_config.build_strategy())
        .when(|err: &SmsError| err.is_retryable_rent())
        .notify(self.notifier("rent_number"))
        .await
    }

    /// Each attempt works on a copy so a failed check never leaves the
    /// caller's order half-updated.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "RetryableProvider::check_sms",
            skip_all,
            fields(order_id = %order.order_id())
        )
    )]
    async fn check_sms(&self, order: &mut Order) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let snapshot = order.clone();
        let updated = (|| {
            let inner = Arc::clone(&inner);
            let mut working = snapshot.clone();
            async move {
                inner.check_sms(&mut working).await?;
                Ok::<_, SmsError>(working)
            }
        })
        .retry(self.retry_config.build_strategy())
        .when(|err: &SmsError| err.is_retryable())
        .notify(self.notifier("check_sms"))
        .await?;

        *order = updated;
        Ok(())
    }

    async fn cancel_rent(&self, order_id: &OrderId) -> Result<bool> {
        self.inner.cancel_rent(order_id).await
    }
}
