//! SMS-Man provider implementation.

use super::client::SmsManClient;
use super::types::RentStatus;
use crate::errors::Result;
use crate::manager::config::DEFAULT_RENT_HOURS;
use crate::observer::SmsEvent;
use crate::order::Order;
use crate::providers::traits::SmsProvider;
use crate::types::{OrderId, ProviderKind, SmsCode};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// SMS-Man provider.
///
/// This wraps the [`SmsManClient`] and implements [`SmsProvider`].
#[derive(Debug, Clone)]
pub struct SmsManProvider {
    client: SmsManClient,
}

impl SmsManProvider {
    pub fn new(client: SmsManClient) -> Self {
        Self { client }
    }

    /// Get reference to the inner client.
    pub fn client(&self) -> &SmsManClient {
        &self.client
    }
}

impl SmsProvider for SmsManProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SmsMan
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "SmsManProvider::get_balance", skip_all)
    )]
    async fn get_balance(&self) -> Result<f64> {
        self.client.get_balance().await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsManProvider::rent_number",
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
        let minutes = duration_hours.unwrap_or(DEFAULT_RENT_HOURS).saturating_mul(60);
        let (request_id, number) = self.client.get_number(country, service, minutes).await?;

        let order = Order::new(request_id, number, country, service, ProviderKind::SmsMan);

        #[cfg(feature = "tracing")]
        info!(order_id = %order.order_id(), "Number rented");

        self.client.observer().emit(SmsEvent::NumberRented {
            provider: ProviderKind::SmsMan,
            order_id: order.order_id().clone(),
        });

        Ok(order)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsManProvider::check_sms",
            skip_all,
            fields(order_id = %order.order_id())
        )
    )]
    async fn check_sms(&self, order: &mut Order) -> Result<()> {
        let records = self.client.get_sms(order.order_id()).await?;

        if let Some(latest) = records.into_iter().last() {
            #[cfg(feature = "tracing")]
            debug!(has_code = latest.code.is_some(), "Message received");

            order.record_sms(latest.code.map(SmsCode::new), latest.text);
        }

        Ok(())
    }

    async fn cancel_rent(&self, order_id: &OrderId) -> Result<bool> {
        self.client.set_status(order_id, RentStatus::Close).await?;

        #[cfg(feature = "tracing")]
        debug!(order_id = %order_id, "Rental closed");

        Ok(true)
    }
}
