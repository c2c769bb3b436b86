//! Vak-SMS API in rent mode.
//!
//! The key travels as the `apiKey` query parameter. Errors come back as
//! `{"error": "<code>"}`; the codes that mean "no stock" and "no money" are
//! mapped to [`crate::SmsError::NoNumber`] and [`crate::SmsError::Balance`].
//!
//! # Example
//!
//! ```rust,ignore
//! use sms_rental::vak_sms::{VakSmsClient, VakSmsProvider};
//! use sms_rental::SmsProvider;
//!
//! let client = VakSmsClient::with_api_key("your_key")?;
//! let provider = VakSmsProvider::new(client);
//!
//! let mut order = provider.rent_number("ru", "tg", None).await?;
//! provider.check_sms(&mut order).await?;
//! ```

pub mod client;
pub mod provider;
pub mod types;

pub use client::{VakSmsClient, VakSmsClientBuilder};
pub use provider::VakSmsProvider;
pub use types::VakErrorCode;
