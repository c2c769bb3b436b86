//! # SMS Rental
//!
//! A unified client for renting temporary phone numbers and collecting the
//! verification codes sent to them.
//!
//! Each vendor speaks its own dialect: different authentication, request
//! parameters, response shapes and status vocabularies. This crate hides
//! them behind one [`SmsProvider`] trait and one [`Order`] model, and adds
//! a bounded, cancellable polling loop on top.
//!
//! ## Supported Providers
//!
//! | Provider | Feature | Website |
//! |----------|---------|---------|
//! | SMS-Man | `sms-man` (default) | <https://sms-man.com> |
//! | 5SIM | `five-sim` (default) | <https://5sim.net> |
//! | Vak-SMS | `vak-sms` (default) | <https://vak-sms.com> |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sms_rental::{PollOutcome, ProviderKind, SmsManager};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = SmsManager::new(ProviderKind::FiveSim, "your_api_key")?;
//!
//!     println!("Balance: {}", manager.get_balance().await?);
//!
//!     let mut order = manager.rent_number("russia", "telegram", None).await?;
//!     println!("Got number: {}", order.phone_number());
//!
//!     let report = manager
//!         .wait_for_code(&mut order, Duration::from_secs(120), Duration::from_secs(5))
//!         .await?;
//!
//!     match report.outcome {
//!         PollOutcome::Received => println!("Code: {}", order.sms_code().unwrap()),
//!         other => {
//!             println!("No code: {other:?}");
//!             manager.cancel_order(&mut order).await?;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SmsManager<P>         (wait_for_code, PollSession)
//!         │
//!         ▼
//! RetryableProvider<P>  (optional retry wrapper)
//!         │
//!         ▼
//!   SmsProvider         (trait: AnyProvider, SmsManProvider, FiveSimProvider, VakSmsProvider)
//!         │
//!         ▼
//!   HttpTransport       (one request, normalized body, RequestError)
//! ```
//!
//! ## Features
//!
//! - `sms-man`, `five-sim`, `vak-sms` - provider adapters (all enabled by default)
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)

#[cfg(not(any(feature = "sms-man", feature = "five-sim", feature = "vak-sms")))]
compile_error!("enable at least one of the `sms-man`, `five-sim` or `vak-sms` features");

pub mod errors;
pub mod manager;
pub mod observer;
pub mod order;
pub mod providers;
pub mod transport;
pub mod types;
pub(crate) mod utils;

// Re-export commonly used types at the crate root
pub use errors::{ConfigError, RequestError, Result, RetryableError, SmsError};
pub use manager::{
    ManagerConfig, ManagerConfigBuilder, PollOutcome, PollReport, PollSession, PollStep,
    SmsManager, SmsManagerBuilder,
};
pub use observer::{EventHook, SmsEvent};
pub use order::{Order, OrderStatus};
pub use providers::{
    AnyProvider, AnyProviderBuilder, OnRetryCallback, RetryableProvider, SmsProvider,
};
pub use transport::{ApiRequest, HttpTransport, TEXT_RESPONSE_KEY};
pub use types::{OrderId, PhoneNumber, ProviderKind, SmsCode, UnknownProviderError};
pub use utils::retry::RetryConfig;

pub use tokio_util::sync::CancellationToken;

#[cfg(feature = "five-sim")]
pub use providers::five_sim;
#[cfg(feature = "sms-man")]
pub use providers::sms_man;
#[cfg(feature = "vak-sms")]
pub use providers::vak_sms;
