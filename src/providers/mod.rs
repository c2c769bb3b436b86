//! SMS provider implementations.

pub(crate) mod any;
pub(crate) mod retryable;
pub(crate) mod traits;

#[cfg(feature = "five-sim")]
pub mod five_sim;
#[cfg(feature = "sms-man")]
pub mod sms_man;
#[cfg(feature = "vak-sms")]
pub mod vak_sms;

pub use any::{AnyProvider, AnyProviderBuilder};
pub use retryable::{OnRetryCallback, RetryableProvider};
pub use traits::SmsProvider;
