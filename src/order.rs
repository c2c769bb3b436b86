//! The unified rental record shared by every provider.

use crate::types::{OrderId, PhoneNumber, ProviderKind, SmsCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Lifecycle status of a rental.
///
/// Waiting and Unknown are the open states; Received means a message has
/// been observed; Finished, Timeout and Cancelled close the rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Waiting,
    Received,
    Finished,
    Timeout,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Waiting | Self::Unknown => 0,
            Self::Received => 1,
            Self::Finished | Self::Timeout | Self::Cancelled => 2,
        }
    }

    /// Whether polling this order can still produce a code.
    pub fn is_open(self) -> bool {
        self.rank() == 0
    }

    /// Finished, Timeout or Cancelled.
    pub fn is_closed(self) -> bool {
        self.rank() == 2
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Received => "received",
            Self::Finished => "finished",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rented number and everything observed about it so far.
///
/// Identity fields are fixed at construction. The mutable part (status and
/// message) only changes through methods that keep the lifecycle moving
/// forward and never drop a captured code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    phone_number: PhoneNumber,
    country: String,
    service: String,
    provider: ProviderKind,
    status: OrderStatus,
    sms_text: Option<String>,
    sms_code: Option<SmsCode>,
    created_at: DateTime<Utc>,
    expiration_time: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a fresh order in the Waiting state, stamped with the current time.
    pub fn new(
        order_id: impl Into<OrderId>,
        phone_number: impl Into<PhoneNumber>,
        country: impl Into<String>,
        service: impl Into<String>,
        provider: ProviderKind,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            phone_number: phone_number.into(),
            country: country.into(),
            service: service.into(),
            provider,
            status: OrderStatus::Waiting,
            sms_text: None,
            sms_code: None,
            created_at: Utc::now(),
            expiration_time: None,
        }
    }

    /// Attach the vendor's rental deadline.
    pub fn with_expiration(mut self, expiration_time: Option<DateTime<Utc>>) -> Self {
        self.expiration_time = expiration_time;
        self
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn sms_text(&self) -> Option<&str> {
        self.sms_text.as_deref()
    }

    pub fn sms_code(&self) -> Option<&SmsCode> {
        self.sms_code.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Vendor-provided deadline. Informational only; polling does not enforce it.
    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        self.expiration_time
    }

    /// True once a non-empty code has been captured.
    pub fn has_code(&self) -> bool {
        self.sms_code.is_some()
    }

    /// Record a message observed by a status check.
    ///
    /// Blank values are ignored, so an empty poll never erases an earlier
    /// code or text. The status advances to Received unless the order has
    /// already been closed.
    pub fn record_sms(&mut self, code: Option<SmsCode>, text: Option<String>) {
        if let Some(code) = code.and_then(|c| SmsCode::non_empty(c.as_str())) {
            self.sms_code = Some(code);
        }
        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            self.sms_text = Some(text);
        }
        self.advance_status(OrderStatus::Received);
    }

    /// Move to `next` if that does not go backwards in the lifecycle.
    ///
    /// Returns whether the status changed. Once closed, an order stays in
    /// the status it closed with.
    pub fn advance_status(&mut self, next: OrderStatus) -> bool {
        if next == self.status || self.status.is_closed() || next.rank() < self.status.rank() {
            return false;
        }
        self.status = next;
        true
    }

    /// Overwrite the status regardless of lifecycle order.
    ///
    /// Reserved for the two explicit overrides: the polling deadline and a
    /// caller-issued cancel.
    pub(crate) fn force_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}
