//! Types for SMS-Man API responses.

use crate::types::{de_opt_f64, de_opt_string};
use serde::Deserialize;

/// Error fields SMS-Man attaches to failed calls.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorFields {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl ErrorFields {
    /// `get-sms` answers with this code while no message has arrived.
    pub const WAIT_SMS: &'static str = "wait_sms";

    /// True when the only complaint is that no message has arrived yet.
    pub fn is_waiting(&self) -> bool {
        self.error_code
            .as_deref()
            .is_some_and(|code| code.trim().eq_ignore_ascii_case(Self::WAIT_SMS))
    }

    /// Vendor message if the response is an error, preferring `error_msg`.
    pub fn message(&self) -> Option<String> {
        let code = self.error_code.as_ref()?;
        Some(
            self.error_msg
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| code.clone()),
        )
    }
}

/// Response from `/control/get-balance`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceResponse {
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub balance: Option<f64>,
    #[serde(flatten)]
    pub error: ErrorFields,
}

/// Response from `/rent-api/get-number`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetNumberResponse {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub number: Option<String>,
    #[serde(flatten)]
    pub error: ErrorFields,
}

/// One message from `/rent-api/get-sms`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SmsRecord {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub code: Option<String>,
}

/// Status values accepted by `/rent-api/set-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentStatus {
    /// Close the rental.
    Close,
}

impl RentStatus {
    /// Numeric code for the API.
    pub fn code(&self) -> u8 {
        match self {
            Self::Close => 2,
        }
    }
}
