//! Core types for SMS rental operations.

use crate::errors::SmsError;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ProviderKind
// =============================================================================

/// The SMS rental backends this crate can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// <https://sms-man.com>
    #[serde(rename = "sms-man")]
    SmsMan,
    /// <https://5sim.net>
    #[serde(rename = "5sim")]
    FiveSim,
    /// <https://vak-sms.com>
    #[serde(rename = "vak-sms")]
    VakSms,
}

impl ProviderKind {
    /// Stable identifier, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SmsMan => "sms-man",
            Self::FiveSim => "5sim",
            Self::VakSms => "vak-sms",
        }
    }

    /// All known providers.
    pub fn all() -> [ProviderKind; 3] {
        [Self::SmsMan, Self::FiveSim, Self::VakSms]
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a provider name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported provider type '{0}' (expected sms-man, 5sim or vak-sms)")]
pub struct UnknownProviderError(pub String);

impl From<UnknownProviderError> for SmsError {
    fn from(err: UnknownProviderError) -> Self {
        SmsError::Other(err.to_string())
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sms-man" | "smsman" => Ok(Self::SmsMan),
            "5sim" | "five-sim" => Ok(Self::FiveSim),
            "vak-sms" | "vaksms" => Ok(Self::VakSms),
            _ => Err(UnknownProviderError(s.to_string())),
        }
    }
}

// =============================================================================
// OrderId
// =============================================================================

/// Vendor-assigned rental identifier, normalized to its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new OrderId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// SmsCode (OTP)
// =============================================================================

/// SMS verification code (OTP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsCode(String);

impl SmsCode {
    /// Create a new SmsCode.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Build a code from a vendor field, treating blank values as absent.
    pub fn non_empty(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            None
        } else {
            Some(Self(code))
        }
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SmsCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SmsCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SmsCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// =============================================================================
// PhoneNumber
// =============================================================================

/// Rented phone number exactly as the vendor returned it.
///
/// Vendors disagree on whether they include the leading `+`; the value is
/// kept verbatim and not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a new PhoneNumber.
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Get the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// International format with exactly one leading `+`.
    pub fn with_plus_prefix(&self) -> String {
        format!("+{}", self.0.trim().trim_start_matches('+'))
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for PhoneNumber {
    fn from(number: String) -> Self {
        Self(number)
    }
}

impl From<&str> for PhoneNumber {
    fn from(number: &str) -> Self {
        Self(number.to_string())
    }
}

// =============================================================================
// Lenient wire decoding
// =============================================================================

/// Vendors send ids, phone numbers and balances as either JSON strings or
/// JSON numbers, sometimes both within one API.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

/// Deserialize an optional string-or-number field into `Option<String>`.
pub(crate) fn de_opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(d)?.map(StringOrNumber::into_string))
}

/// Deserialize an optional string-or-number field into `Option<f64>`.
pub(crate) fn de_opt_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber>::deserialize(d)? {
        None => Ok(None),
        Some(StringOrNumber::Int(n)) => Ok(Some(n as f64)),
        Some(StringOrNumber::UInt(n)) => Ok(Some(n as f64)),
        Some(StringOrNumber::Float(n)) => Ok(Some(n)),
        Some(StringOrNumber::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("'{s}' is not a number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "de_opt_string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "de_opt_f64")]
        balance: Option<f64>,
    }

    #[test]
    fn test_provider_kind_round_trip_names() {
        for kind in ProviderKind::all() {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
        assert_eq!(" 5SIM ".parse::<ProviderKind>().unwrap(), ProviderKind::FiveSim);
        assert!("twilio".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_serde_names() {
        let json = serde_json::to_string(&ProviderKind::FiveSim).unwrap();
        assert_eq!(json, r#""5sim""#);
        let kind: ProviderKind = serde_json::from_str(r#""vak-sms""#).unwrap();
        assert_eq!(kind, ProviderKind::VakSms);
    }

    #[test]
    fn test_unknown_provider_becomes_other_error() {
        let err: SmsError = "foo".parse::<ProviderKind>().unwrap_err().into();
        assert!(matches!(err, SmsError::Other(_)));
    }

    #[test]
    fn test_sms_code_non_empty() {
        assert!(SmsCode::non_empty("").is_none());
        assert!(SmsCode::non_empty("   ").is_none());
        assert_eq!(SmsCode::non_empty("4821").unwrap().as_str(), "4821");
    }

    #[test]
    fn test_phone_number_plus_prefix() {
        assert_eq!(PhoneNumber::new("79001234567").with_plus_prefix(), "+79001234567");
        assert_eq!(PhoneNumber::new("+79001234567").with_plus_prefix(), "+79001234567");
    }

    #[test]
    fn test_string_or_number_fields() {
        let p: Probe = serde_json::from_str(r#"{"id": 123456, "balance": "100.50"}"#).unwrap();
        assert_eq!(p.id.as_deref(), Some("123456"));
        assert_eq!(p.balance, Some(100.5));

        let p: Probe = serde_json::from_str(r#"{"id": "abc", "balance": 7}"#).unwrap();
        assert_eq!(p.id.as_deref(), Some("abc"));
        assert_eq!(p.balance, Some(7.0));

        let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert!(p.id.is_none());
        assert!(p.balance.is_none());
    }

    #[test]
    fn test_balance_rejects_garbage() {
        assert!(serde_json::from_str::<Probe>(r#"{"balance": "lots"}"#).is_err());
    }
}
