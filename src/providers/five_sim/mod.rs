//! 5SIM hosting (rent) API.
//!
//! Every call carries `Authorization: Bearer <key>`. 5SIM has no refunding
//! cancel for hosting numbers; releasing a rental finishes it.
//!
//! # Example
//!
//! ```rust,ignore
//! use sms_rental::five_sim::{FiveSimClient, FiveSimProvider};
//! use sms_rental::SmsProvider;
//!
//! let client = FiveSimClient::with_api_key("your_jwt")?;
//! let provider = FiveSimProvider::new(client);
//!
//! let mut order = provider.rent_number("russia", "telegram", None).await?;
//! provider.check_sms(&mut order).await?;
//! ```

pub mod client;
pub mod provider;
pub mod types;

pub use client::{FiveSimClient, FiveSimClientBuilder};
pub use provider::FiveSimProvider;
pub use types::FiveSimStatus;
