//! Injectable event hook.
//!
//! Providers and the manager report what they are doing through an optional
//! [`EventHook`]. Nothing is installed globally: a caller that wants a log
//! file, a UI status line or test assertions passes a closure at
//! construction time and receives [`SmsEvent`]s.
//!
//! ```rust
//! use sms_rental::{EventHook, SmsEvent};
//! use std::sync::Arc;
//!
//! let hook: EventHook = Arc::new(|event: &SmsEvent| {
//!     eprintln!("{event}");
//! });
//! ```

use crate::order::OrderStatus;
use crate::types::{OrderId, ProviderKind};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked for every [`SmsEvent`].
pub type EventHook = Arc<dyn Fn(&SmsEvent) + Send + Sync>;

/// Something observable happened at a provider or polling boundary.
///
/// Endpoints are reported as URL paths only; query strings may carry API
/// keys and are never included.
#[derive(Debug, Clone, PartialEq)]
pub enum SmsEvent {
    /// An HTTP request is about to be sent.
    RequestSent {
        provider: ProviderKind,
        method: String,
        endpoint: String,
    },
    /// A response arrived (any status).
    ResponseReceived {
        provider: ProviderKind,
        endpoint: String,
        status: u16,
    },
    /// The request failed at the transport or HTTP-status level.
    RequestFailed {
        provider: ProviderKind,
        endpoint: String,
        message: String,
    },
    /// A number was rented.
    NumberRented {
        provider: ProviderKind,
        order_id: OrderId,
    },
    /// Polling for a code started.
    PollStarted { order_id: OrderId, timeout: Duration },
    /// A code was captured.
    CodeReceived { order_id: OrderId, elapsed: Duration },
    /// The vendor closed the rental before a code arrived.
    PollEnded {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// The polling deadline passed without a code.
    PollTimedOut { order_id: OrderId, polls: u32 },
    /// The caller interrupted polling.
    PollInterrupted { order_id: OrderId, polls: u32 },
    /// A rental was released at the vendor.
    RentCancelled { order_id: OrderId, success: bool },
}

impl Display for SmsEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestSent {
                provider,
                method,
                endpoint,
            } => write!(f, "[{provider}] {method} {endpoint}"),
            Self::ResponseReceived {
                provider,
                endpoint,
                status,
            } => write!(f, "[{provider}] {endpoint} -> {status}"),
            Self::RequestFailed {
                provider,
                endpoint,
                message,
            } => write!(f, "[{provider}] {endpoint} failed: {message}"),
            Self::NumberRented { provider, order_id } => {
                write!(f, "[{provider}] rented order {order_id}")
            }
            Self::PollStarted { order_id, timeout } => write!(
                f,
                "waiting up to {:.1}s for a code on order {order_id}",
                timeout.as_secs_f64()
            ),
            Self::CodeReceived { order_id, elapsed } => write!(
                f,
                "code received for order {order_id} after {:.1}s",
                elapsed.as_secs_f64()
            ),
            Self::PollEnded { order_id, status } => {
                write!(f, "order {order_id} closed by vendor as {status}")
            }
            Self::PollTimedOut { order_id, polls } => {
                write!(f, "timed out on order {order_id} after {polls} polls")
            }
            Self::PollInterrupted { order_id, polls } => {
                write!(f, "polling of order {order_id} interrupted after {polls} polls")
            }
            Self::RentCancelled { order_id, success } => {
                write!(f, "cancel of order {order_id}: success={success}")
            }
        }
    }
}

/// Optional hook holder with a cheap no-op when nothing is installed.
#[derive(Clone, Default)]
pub(crate) struct Observer {
    hook: Option<EventHook>,
}

impl Observer {
    pub(crate) fn new(hook: Option<EventHook>) -> Self {
        Self { hook }
    }

    pub(crate) fn emit(&self, event: SmsEvent) {
        if let Some(hook) = &self.hook {
            hook(&event);
        }
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("hook", &self.hook.as_ref().map(|_| "..."))
            .finish()
    }
}
