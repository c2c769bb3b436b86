//! SMS-Man HTTP client.

use super::types::{BalanceResponse, ErrorFields, GetNumberResponse, RentStatus, SmsRecord};
use crate::errors::{RequestError, Result};
use crate::observer::{EventHook, Observer};
use crate::transport::{
    ApiRequest, HttpTransport, decode_as, endpoint_url, parse_base_url, reject_text,
};
use crate::types::{OrderId, ProviderKind};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Default SMS-Man API root. Balance lives under `/control`, rentals under
/// `/rent-api`.
pub const DEFAULT_API_URL: &str = "https://api.sms-man.com";

const PROVIDER: ProviderKind = ProviderKind::SmsMan;

/// SMS-Man HTTP client.
#[derive(Clone)]
pub struct SmsManClient {
    transport: HttpTransport,
    api_key: SecretString,
    endpoint: Url,
}

impl std::fmt::Debug for SmsManClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsManClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`SmsManClient`].
pub struct SmsManClientBuilder {
    api_key: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    hook: Option<EventHook>,
}

impl SmsManClientBuilder {
    /// Create a new builder with the given API token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: None,
            http_client: None,
            hook: None,
        }
    }

    /// Set a custom API root.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set a custom HTTP client with middleware.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Receive request/response events.
    pub fn observer(mut self, hook: EventHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Build the [`SmsManClient`].
    pub fn build(self) -> Result<SmsManClient> {
        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => parse_base_url(DEFAULT_API_URL)?,
        };

        Ok(SmsManClient {
            transport: HttpTransport::new(PROVIDER, self.http_client, self.hook)?,
            api_key: SecretString::from(self.api_key),
            endpoint,
        })
    }
}

impl SmsManClient {
    /// Create a new client against a custom API root.
    pub fn new(endpoint: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let url = parse_base_url(endpoint.as_ref())?;
        Self::builder(api_key).endpoint(url).build()
    }

    /// Create a new client with the default API URL.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> SmsManClientBuilder {
        SmsManClientBuilder::new(api_key)
    }

    pub(crate) fn observer(&self) -> &Observer {
        self.transport.observer()
    }

    fn request(&self, segments: &[&str]) -> std::result::Result<ApiRequest, RequestError> {
        let url = endpoint_url(&self.endpoint, segments)?;
        Ok(ApiRequest::get(url).query("token", self.api_key.expose_secret()))
    }

    /// Account balance.
    pub async fn get_balance(&self) -> Result<f64> {
        let request = self.request(&["control", "get-balance"])?;
        let value = self.transport.send(request).await?;
        reject_text(PROVIDER, &value)?;

        let response: BalanceResponse = decode_as(PROVIDER, value)?;
        if let Some(message) = response.error.message() {
            return Err(RequestError::vendor(PROVIDER, message).into());
        }

        response
            .balance
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `balance` field").into())
    }

    /// Rent a number for `time_minutes`.
    ///
    /// Returns `(request_id, number)`.
    pub async fn get_number(
        &self,
        country_id: &str,
        service_id: &str,
        time_minutes: u32,
    ) -> Result<(String, String)> {
        let request = self
            .request(&["rent-api", "get-number"])?
            .query("country_id", country_id)
            .query("service_id", service_id)
            .query("time", time_minutes);

        let value = self.transport.send(request).await?;
        reject_text(PROVIDER, &value)?;

        let response: GetNumberResponse = decode_as(PROVIDER, value)?;
        if let Some(message) = response.error.message() {
            return Err(RequestError::vendor(PROVIDER, message).into());
        }

        let request_id = response
            .request_id
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `request_id` field"))?;
        let number = response
            .number
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `number` field"))?;

        Ok((request_id, number))
    }

    /// Messages received on a rental, oldest first.
    ///
    /// `wait_sms` and payloads without a message list mean "no messages
    /// yet"; any other `error_code` is a vendor error.
    pub async fn get_sms(&self, request_id: &OrderId) -> Result<Vec<SmsRecord>> {
        let request = self
            .request(&["rent-api", "get-sms"])?
            .query("request_id", request_id);

        let value = self.transport.send(request).await?;
        if value.is_array() {
            return Ok(decode_as(PROVIDER, value)?);
        }

        let error: ErrorFields = match value {
            Value::Object(_) => decode_as(PROVIDER, value)?,
            _ => ErrorFields::default(),
        };
        if error.is_waiting() {
            #[cfg(feature = "tracing")]
            debug!(request_id = %request_id, "No message yet");
            return Ok(Vec::new());
        }
        if let Some(message) = error.message() {
            return Err(RequestError::vendor(PROVIDER, message).into());
        }

        Ok(Vec::new())
    }

    /// Change the rental status.
    pub async fn set_status(&self, request_id: &OrderId, status: RentStatus) -> Result<()> {
        let request = self
            .request(&["rent-api", "set-status"])?
            .query("request_id", request_id)
            .query("status", status.code());

        self.transport.send(request).await?;
        Ok(())
    }
}
