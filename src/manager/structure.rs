//! Manager implementation.

use super::config::ManagerConfig;
use super::poll::{PollReport, PollSession, PollStep};
use crate::errors::Result;
use crate::observer::{EventHook, Observer, SmsEvent};
use crate::order::{Order, OrderStatus};
use crate::providers::any::AnyProvider;
use crate::providers::traits::SmsProvider;
use crate::types::{OrderId, ProviderKind};
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{debug, warn};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Front door to one SMS rental provider.
///
/// The manager binds a provider for its lifetime and adds the waiting
/// logic on top of it:
/// - balance, rent, check and cancel pass straight through
/// - [`wait_for_code`](Self::wait_for_code) polls until a code arrives, the
///   vendor closes the order, or the deadline passes
/// - [`wait_for_code_cancellable`](Self::wait_for_code_cancellable) does the
///   same and can be interrupted from another task
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::{ProviderKind, SmsManager};
///
/// let manager = SmsManager::new(ProviderKind::FiveSim, "api_key")?;
/// let mut order = manager.rent_number("russia", "telegram", None).await?;
/// let report = manager.wait_for_code_with_defaults(&mut order).await?;
///
/// if report.is_received() {
///     println!("code: {}", order.sms_code().unwrap());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SmsManager<P: SmsProvider = AnyProvider> {
    provider: P,
    config: ManagerConfig,
    observer: Observer,
}

impl SmsManager<AnyProvider> {
    /// Manager for `kind` with default settings.
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Result<Self> {
        Self::builder(kind, api_key).build()
    }

    /// Create a new builder for SmsManager.
    pub fn builder(kind: ProviderKind, api_key: impl Into<String>) -> SmsManagerBuilder {
        SmsManagerBuilder::new(kind, api_key)
    }
}

impl<P: SmsProvider> SmsManager<P> {
    /// Manager around an already built provider.
    ///
    /// The config is taken as is; call [`ManagerConfig::validate`] first if
    /// it comes from user input.
    pub fn with_provider(provider: P, config: ManagerConfig, hook: Option<EventHook>) -> Self {
        Self {
            provider,
            config,
            observer: Observer::new(hook),
        }
    }

    /// Get reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Get reference to the manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub(crate) fn observer(&self) -> &Observer {
        &self.observer
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_manager.get_balance", skip_all)
    )]
    pub async fn get_balance(&self) -> Result<f64> {
        self.provider.get_balance().await
    }

    /// Rent a number; `None` falls back to the configured duration.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_manager.rent_number",
            skip_all,
            fields(provider = %self.kind(), country = %country, service = %service)
        )
    )]
    pub async fn rent_number(
        &self,
        country: &str,
        service: &str,
        duration_hours: Option<u32>,
    ) -> Result<Order> {
        let hours = duration_hours.unwrap_or(self.config.rent_duration_hours);

        #[cfg(feature = "tracing")]
        debug!(duration_hours = hours, "Requesting phone number");

        self.provider.rent_number(country, service, Some(hours)).await
    }

    pub async fn check_sms(&self, order: &mut Order) -> Result<()> {
        self.provider.check_sms(order).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_manager.cancel_rent",
            skip_all,
            fields(order_id = %order_id)
        )
    )]
    pub async fn cancel_rent(&self, order_id: &OrderId) -> Result<bool> {
        let success = self.provider.cancel_rent(order_id).await?;

        self.observer.emit(SmsEvent::RentCancelled {
            order_id: order_id.clone(),
            success,
        });
        Ok(success)
    }

    /// Release the rental and mark the order cancelled if the vendor agreed.
    pub async fn cancel_order(&self, order: &mut Order) -> Result<bool> {
        let success = self.cancel_rent(order.order_id()).await?;
        if success {
            order.force_status(OrderStatus::Cancelled);
        }
        Ok(success)
    }

    /// Poll `order` until a code arrives, the vendor closes it, or
    /// `timeout` passes.
    ///
    /// The first check happens immediately and later ones `interval` apart,
    /// with the last pause cut short at the deadline. Running out of time is
    /// reported as [`PollOutcome::TimedOut`](crate::PollOutcome::TimedOut)
    /// and marks the order [`OrderStatus::Timeout`]; the rental itself is
    /// left alone. Provider errors end the wait and are returned unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_manager.wait_for_code",
            skip_all,
            fields(order_id = %order.order_id())
        )
    )]
    pub async fn wait_for_code(
        &self,
        order: &mut Order,
        timeout: Duration,
        interval: Duration,
    ) -> Result<PollReport> {
        self.run(order, timeout, interval, None).await
    }

    /// [`wait_for_code`](Self::wait_for_code) that stops early once `token`
    /// is cancelled.
    ///
    /// The token is checked before every poll and raced against each pause.
    /// An interrupted wait returns
    /// [`PollOutcome::Interrupted`](crate::PollOutcome::Interrupted) and
    /// leaves the order as the last completed check left it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_manager.wait_for_code_cancellable",
            skip_all,
            fields(order_id = %order.order_id())
        )
    )]
    pub async fn wait_for_code_cancellable(
        &self,
        order: &mut Order,
        timeout: Duration,
        interval: Duration,
        token: &CancellationToken,
    ) -> Result<PollReport> {
        self.run(order, timeout, interval, Some(token)).await
    }

    /// [`wait_for_code`](Self::wait_for_code) with the configured timeout
    /// and interval.
    pub async fn wait_for_code_with_defaults(&self, order: &mut Order) -> Result<PollReport> {
        self.wait_for_code(order, self.config.timeout, self.config.poll_interval)
            .await
    }

    async fn run(
        &self,
        order: &mut Order,
        timeout: Duration,
        interval: Duration,
        token: Option<&CancellationToken>,
    ) -> Result<PollReport> {
        let mut session = PollSession::new(timeout, interval);

        let result = loop {
            if token.is_some_and(CancellationToken::is_cancelled) {
                break Ok(session.interrupt(self, order));
            }

            let next_in = match session.step(self, order).await {
                Ok(PollStep::Continue { next_in }) => next_in,
                Ok(PollStep::Done(report)) => break Ok(report),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    warn!(error = %e, polls = session.polls(), "Polling failed");
                    break Err(e);
                }
            };

            match token {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => break Ok(session.interrupt(self, order)),
                        _ = tokio::time::sleep(next_in) => {}
                    }
                }
                None => tokio::time::sleep(next_in).await,
            }
        };

        #[cfg(feature = "tracing")]
        match &result {
            Ok(_) => tracing::Span::current().set_status(Status::Ok),
            Err(e) => tracing::Span::current().set_status(Status::error(e.to_string())),
        }

        result
    }
}

/// Builder for an [`SmsManager`] over one of the built-in providers.
///
/// ```rust,ignore
/// use sms_rental::{ManagerConfig, ProviderKind, SmsManager};
///
/// let manager = SmsManager::builder(ProviderKind::SmsMan, "api_key")
///     .config(ManagerConfig::patient())
///     .observer(Arc::new(|event| eprintln!("{event}")))
///     .build()?;
/// ```
pub struct SmsManagerBuilder {
    kind: ProviderKind,
    api_key: String,
    config: ManagerConfig,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    hook: Option<EventHook>,
}

impl SmsManagerBuilder {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            config: ManagerConfig::default(),
            endpoint: None,
            http_client: None,
            hook: None,
        }
    }

    /// Set the full configuration.
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the vendor's API URL.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom HTTP client with middleware.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Receive provider and polling events.
    pub fn observer(mut self, hook: EventHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Validate the config and build the provider and manager.
    pub fn build(self) -> Result<SmsManager<AnyProvider>> {
        self.config.validate()?;

        let mut provider = AnyProvider::builder(self.kind, self.api_key);
        if let Some(endpoint) = self.endpoint {
            provider = provider.endpoint(endpoint);
        }
        if let Some(client) = self.http_client {
            provider = provider.http_client(client);
        }
        if let Some(hook) = self.hook.clone() {
            provider = provider.observer(hook);
        }

        Ok(SmsManager::with_provider(
            provider.build()?,
            self.config,
            self.hook,
        ))
    }
}
