//! Provider trait definition.

use crate::errors::Result;
use crate::order::Order;
use crate::types::{OrderId, ProviderKind};
use std::future::Future;

/// Capability contract every SMS rental backend implements.
///
/// Adapters translate vendor request parameters, response shapes, error
/// encodings and status vocabularies into this one interface:
/// - query the account balance
/// - rent a number for a country/service pair
/// - check an order for new messages, updating it in place
/// - release a rental at the vendor
///
/// # Note on async methods
///
/// All async methods in this trait return `Send` futures, making them
/// compatible with multi-threaded executors.
///
/// # Example
///
/// ```rust,ignore
/// use sms_rental::{Order, OrderId, ProviderKind, Result, SmsProvider};
///
/// struct MyProvider { /* ... */ }
///
/// impl SmsProvider for MyProvider {
///     fn kind(&self) -> ProviderKind {
///         ProviderKind::SmsMan
///     }
///
///     async fn get_balance(&self) -> Result<f64> {
///         // Query the account balance
///     }
///
///     async fn rent_number(&self, country: &str, service: &str, duration_hours: Option<u32>) -> Result<Order> {
///         // Rent a number and build a Waiting order
///     }
///
///     async fn check_sms(&self, order: &mut Order) -> Result<()> {
///         // Poll the vendor and record any message on the order
///     }
///
///     async fn cancel_rent(&self, order_id: &OrderId) -> Result<bool> {
///         // Release the rental
///     }
/// }
/// ```
pub trait SmsProvider: Send + Sync {
    /// Which vendor this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Current account balance in the vendor's currency.
    fn get_balance(&self) -> impl Future<Output = Result<f64>> + Send;

    /// Rent a number.
    ///
    /// # Arguments
    /// * `country` - Vendor-acceptable country code or id
    /// * `service` - Vendor-acceptable service code or id
    /// * `duration_hours` - Rental length; adapters that rent for a fixed
    ///   period ignore it
    ///
    /// # Returns
    /// A new order in the Waiting state. No order is built when the vendor
    /// response lacks its success fields.
    fn rent_number(
        &self,
        country: &str,
        service: &str,
        duration_hours: Option<u32>,
    ) -> impl Future<Output = Result<Order>> + Send;

    /// Ask the vendor for messages on `order` and record what it reports.
    ///
    /// The latest message wins; a check that returns nothing new leaves the
    /// captured code and text untouched.
    fn check_sms(&self, order: &mut Order) -> impl Future<Output = Result<()>> + Send;

    /// Release the rental at the vendor.
    ///
    /// What "release" means differs per vendor (refund-cancel or forced
    /// completion). Returns whether the vendor accepted it.
    fn cancel_rent(&self, order_id: &OrderId) -> impl Future<Output = Result<bool>> + Send;
}
