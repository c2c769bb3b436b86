//! Types for 5SIM API responses.

use crate::types::{de_opt_f64, de_opt_string};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response from `/user/profile`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileResponse {
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub balance: Option<f64>,
}

/// Response from `/user/buy/hosting/{country}/{product}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuyResponse {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

impl BuyResponse {
    /// Parsed `expires` timestamp; unparseable values are dropped.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Response from `/user/check/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sms: Option<Vec<SmsRecord>>,
}

impl CheckResponse {
    pub fn vendor_status(&self) -> FiveSimStatus {
        self.status
            .as_deref()
            .map(FiveSimStatus::from_raw)
            .unwrap_or(FiveSimStatus::Other)
    }
}

/// One message attached to an order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsRecord {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub code: Option<String>,
}

/// Order status vocabulary used by 5SIM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiveSimStatus {
    Pending,
    Received,
    Canceled,
    Timeout,
    Finished,
    Banned,
    /// Anything else, including `RUNNING` on hosting orders.
    Other,
}

impl FiveSimStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RECEIVED" => Self::Received,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            "TIMEOUT" => Self::Timeout,
            "FINISHED" => Self::Finished,
            "BANNED" => Self::Banned,
            _ => Self::Other,
        }
    }
}

/// Plain-text refusals 5SIM returns instead of JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    NoFreePhones,
    NotEnoughBalance,
}

impl Refusal {
    pub fn from_text(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "no free phones" => Some(Self::NoFreePhones),
            "not enough user balance" => Some(Self::NotEnoughBalance),
            _ => None,
        }
    }
}
