//! Error types and traits for SMS rental operations.

use crate::types::ProviderKind;
use thiserror::Error;

/// Trait for errors that can be classified as retryable or permanent.
///
/// This trait provides two levels of retryability classification:
///
/// 1. **Call-level** (`is_retryable`): Whether the same call (same order id)
///    can simply be issued again. Use this for transient errors like network
///    timeouts or vendor-side 5xx responses.
///
/// 2. **Operation-level** (`should_retry_operation`): Whether a fresh attempt
///    (renting a new number) might succeed even though this one failed.
///
/// # Examples
///
/// ```rust
/// use sms_rental::RetryableError;
///
/// enum MyError {
///     NetworkTimeout,
///     OutOfStock,
///     InvalidApiKey,
/// }
///
/// impl RetryableError for MyError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, MyError::NetworkTimeout)
///     }
///
///     fn should_retry_operation(&self) -> bool {
///         match self {
///             MyError::NetworkTimeout => true,
///             MyError::OutOfStock => true,
///             MyError::InvalidApiKey => false,
///         }
///     }
/// }
/// ```
pub trait RetryableError {
    /// Returns true if this error represents a transient failure
    /// that might succeed when the same call is repeated.
    fn is_retryable(&self) -> bool;

    /// Returns true if a fresh operation (renting a new number) might succeed.
    ///
    /// Default implementation returns the same as `is_retryable()`.
    fn should_retry_operation(&self) -> bool {
        self.is_retryable()
    }
}

/// Failure to talk to a vendor or to make sense of what it answered.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// A request URL could not be assembled from the configured endpoint.
    #[error("Invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Connection refused, DNS failure, timeout and friends.
    #[error("Network error: {0}")]
    Transport(#[source] reqwest_middleware::Error),

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// The vendor answered with a 4xx/5xx status.
    #[error("API returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A body declared as JSON did not parse.
    #[error("Failed to decode JSON response: {0}")]
    DecodeJson(#[source] serde_json::Error),

    /// The vendor reported a failure in its own error format.
    #[error("{provider} error: {message}")]
    Vendor {
        provider: ProviderKind,
        message: String,
    },

    /// The payload lacked a required field or had the wrong shape.
    #[error("Unexpected {provider} response: {message}")]
    UnexpectedResponse {
        provider: ProviderKind,
        message: String,
    },
}

impl RequestError {
    pub(crate) fn unexpected(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            provider,
            message: message.into(),
        }
    }

    pub(crate) fn vendor(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::Vendor {
            provider,
            message: message.into(),
        }
    }
}

/// Main error type returned by providers and the manager.
///
/// Every variant renders a message that is safe to show to an end user.
#[derive(Debug, Error)]
pub enum SmsError {
    /// Network/transport failure, HTTP error status, or a payload the
    /// adapter could not accept.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The vendor reports insufficient funds for the rent attempt.
    #[error("{provider}: insufficient balance")]
    Balance { provider: ProviderKind },

    /// The vendor has no numbers for the requested country/service.
    #[error("{provider}: no numbers available")]
    NoNumber { provider: ProviderKind },

    /// Any other failure not covered above.
    #[error("SMS error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SmsError>;

impl SmsError {
    /// Whether a failed rent can be repeated without risking a second rental.
    ///
    /// Only answers that prove nothing was bought qualify: no stock, or a
    /// 429. A dropped connection or a 5xx may arrive after the vendor already
    /// charged for the number.
    pub fn is_retryable_rent(&self) -> bool {
        matches!(
            self,
            SmsError::NoNumber { .. }
                | SmsError::Request(RequestError::HttpStatus { status: 429, .. })
        )
    }
}

impl RetryableError for SmsError {
    fn is_retryable(&self) -> bool {
        match self {
            SmsError::Request(RequestError::Transport(_)) => true,
            SmsError::Request(RequestError::HttpStatus { status, .. }) => {
                *status == 429 || *status >= 500
            }
            // Stock comes and goes
            SmsError::NoNumber { .. } => true,
            SmsError::Request(_) | SmsError::Balance { .. } | SmsError::Other(_) => false,
        }
    }

    fn should_retry_operation(&self) -> bool {
        match self {
            SmsError::Balance { .. } | SmsError::Other(_) => false,
            SmsError::Request(RequestError::BuildHttpClient(_))
            | SmsError::Request(RequestError::InvalidUrl { .. }) => false,
            SmsError::Request(RequestError::HttpStatus { status, .. }) => {
                !matches!(status, 401 | 403)
            }
            SmsError::Request(_) | SmsError::NoNumber { .. } => true,
        }
    }
}

/// Invalid manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A zero timeout would time out before the first poll.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    /// A zero poll interval would hammer the vendor.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}
