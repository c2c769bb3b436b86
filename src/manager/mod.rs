//! Manager binding one provider, with bounded and cancellable polling.

pub(crate) mod config;
pub(crate) mod poll;
pub(crate) mod structure;

pub use config::{ManagerConfig, ManagerConfigBuilder};
pub use poll::{PollOutcome, PollReport, PollSession, PollStep};
pub use structure::{SmsManager, SmsManagerBuilder};
