//! 5SIM provider implementation.

use super::client::FiveSimClient;
use super::types::FiveSimStatus;
use crate::errors::{RequestError, Result};
use crate::observer::SmsEvent;
use crate::order::{Order, OrderStatus};
use crate::providers::traits::SmsProvider;
use crate::types::{OrderId, ProviderKind, SmsCode};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

const PROVIDER: ProviderKind = ProviderKind::FiveSim;

/// 5SIM provider.
///
/// Hosting numbers are rented for a vendor-fixed period, so the duration
/// argument of [`SmsProvider::rent_number`] is ignored.
#[derive(Debug, Clone)]
pub struct FiveSimProvider {
    client: FiveSimClient,
}

impl FiveSimProvider {
    pub fn new(client: FiveSimClient) -> Self {
        Self { client }
    }

    /// Get reference to the inner client.
    pub fn client(&self) -> &FiveSimClient {
        &self.client
    }
}

impl SmsProvider for FiveSimProvider {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "FiveSimProvider::get_balance", skip_all)
    )]
    async fn get_balance(&self) -> Result<f64> {
        self.client.get_balance().await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimProvider::rent_number",
            skip_all,
            fields(country = %country, service = %service)
        )
    )]
    async fn rent_number(
        &self,
        country: &str,
        service: &str,
        _duration_hours: Option<u32>,
    ) -> Result<Order> {
        let response = self.client.buy_hosting(country, service).await?;

        let expires_at = response.expires_at();
        let id = response
            .id
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `id` field"))?;
        let phone = response
            .phone
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `phone` field"))?;

        let order = Order::new(id, phone, country, service, PROVIDER).with_expiration(expires_at);

        #[cfg(feature = "tracing")]
        info!(order_id = %order.order_id(), "Number rented");

        self.client.observer().emit(SmsEvent::NumberRented {
            provider: PROVIDER,
            order_id: order.order_id().clone(),
        });

        Ok(order)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FiveSimProvider::check_sms",
            skip_all,
            fields(order_id = %order.order_id())
        )
    )]
    async fn check_sms(&self, order: &mut Order) -> Result<()> {
        let response = self.client.check_order(order.order_id()).await?;
        let vendor_status = response.vendor_status();

        if let Some(latest) = response.sms.and_then(|list| list.into_iter().last()) {
            #[cfg(feature = "tracing")]
            debug!(has_code = latest.code.is_some(), "Message received");

            order.record_sms(latest.code.map(SmsCode::new), latest.text);
        }

        // Closing statuses apply on top of any captured message.
        match vendor_status {
            FiveSimStatus::Finished => {
                order.advance_status(OrderStatus::Finished);
            }
            FiveSimStatus::Canceled | FiveSimStatus::Banned => {
                order.advance_status(OrderStatus::Cancelled);
            }
            FiveSimStatus::Timeout => {
                order.advance_status(OrderStatus::Timeout);
            }
            FiveSimStatus::Pending | FiveSimStatus::Received | FiveSimStatus::Other => {}
        }

        Ok(())
    }

    async fn cancel_rent(&self, order_id: &OrderId) -> Result<bool> {
        self.client.finish_order(order_id).await?;

        #[cfg(feature = "tracing")]
        debug!(order_id = %order_id, "Order finished");

        Ok(true)
    }
}
