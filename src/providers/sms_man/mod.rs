//! SMS-Man rent API.
//!
//! The token travels as a query parameter. Country and service are the
//! vendor's numeric ids, passed through as given.
//!
//! # Example
//!
//! ```rust,ignore
//! use sms_rental::sms_man::{SmsManClient, SmsManProvider};
//! use sms_rental::SmsProvider;
//!
//! let client = SmsManClient::with_api_key("your_token")?;
//! let provider = SmsManProvider::new(client);
//!
//! let mut order = provider.rent_number("3", "1", Some(4)).await?;
//! provider.check_sms(&mut order).await?;
//! ```

pub mod client;
pub mod provider;
pub mod types;

pub use client::{SmsManClient, SmsManClientBuilder};
pub use provider::SmsManProvider;
