//! Types for Vak-SMS API responses.

use crate::types::{de_opt_f64, de_opt_string};
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};

/// Error codes returned in the `error` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VakErrorCode {
    /// No numbers for the requested country/service.
    NoNumbers,
    /// Not enough money on the account.
    NoBalance,
    /// Still waiting for a message (status checks only).
    Wait,
    /// Anything else, kept verbatim.
    Other { raw: String },
}

impl VakErrorCode {
    /// Parse error code from the raw `error` field.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "no_numbers" | "noNumber" => Self::NoNumbers,
            "no_balance" | "noMoney" => Self::NoBalance,
            "wait" | "waitSMS" => Self::Wait,
            other => Self::Other {
                raw: other.to_string(),
            },
        }
    }

    /// API error code string representation.
    pub fn code_name(&self) -> &str {
        match self {
            Self::NoNumbers => "no_numbers",
            Self::NoBalance => "no_balance",
            Self::Wait => "wait",
            Self::Other { raw } => raw.as_str(),
        }
    }
}

impl Display for VakErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_name())
    }
}

/// Response from `/getBalance/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceResponse {
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub balance: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `/getNumber/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetNumberResponse {
    #[serde(default, rename = "idNum", deserialize_with = "de_opt_string")]
    pub id_num: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub tel: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `/getSmsCode/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetSmsCodeResponse {
    #[serde(default, rename = "smsCode", deserialize_with = "de_opt_string")]
    pub sms_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Status values accepted by `/setStatus/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    /// Finish the rental.
    End,
}

impl SetStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::End => "end",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(VakErrorCode::from_raw("no_numbers"), VakErrorCode::NoNumbers);
        assert_eq!(VakErrorCode::from_raw("noMoney"), VakErrorCode::NoBalance);
        assert_eq!(
            VakErrorCode::from_raw("apiKeyNotFound"),
            VakErrorCode::Other {
                raw: "apiKeyNotFound".to_string()
            }
        );
        assert_eq!(VakErrorCode::from_raw("no_balance").to_string(), "no_balance");
    }

    #[test]
    fn test_get_number_numeric_tel() {
        let resp: GetNumberResponse =
            serde_json::from_str(r#"{"tel": 79991112233, "idNum": "3adb61376b8f"}"#).unwrap();
        assert_eq!(resp.tel.as_deref(), Some("79991112233"));
        assert_eq!(resp.id_num.as_deref(), Some("3adb61376b8f"));
    }

    #[test]
    fn test_sms_code_null() {
        let resp: GetSmsCodeResponse = serde_json::from_str(r#"{"smsCode": null}"#).unwrap();
        assert!(resp.sms_code.is_none());
    }
}
