//! 5SIM HTTP client.

use super::types::{BuyResponse, CheckResponse, ProfileResponse, Refusal};
use crate::errors::{RequestError, Result, SmsError};
use crate::observer::{EventHook, Observer};
use crate::transport::{
    ApiRequest, HttpTransport, decode_as, endpoint_url, parse_base_url, reject_text,
    text_response,
};
use crate::types::{OrderId, ProviderKind};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Default 5SIM API URL.
pub const DEFAULT_API_URL: &str = "https://5sim.net/v1";

const PROVIDER: ProviderKind = ProviderKind::FiveSim;

/// 5SIM HTTP client.
#[derive(Clone)]
pub struct FiveSimClient {
    transport: HttpTransport,
    api_key: SecretString,
    endpoint: Url,
}

impl std::fmt::Debug for FiveSimClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiveSimClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`FiveSimClient`].
pub struct FiveSimClientBuilder {
    api_key: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    hook: Option<EventHook>,
}

impl FiveSimClientBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: None,
            http_client: None,
            hook: None,
        }
    }

    /// Set a custom API endpoint.
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

    /// Build the [`FiveSimClient`].
    pub fn build(self) -> Result<FiveSimClient> {
        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => parse_base_url(DEFAULT_API_URL)?,
        };

        Ok(FiveSimClient {
            transport: HttpTransport::new(PROVIDER, self.http_client, self.hook)?,
            api_key: SecretString::from(self.api_key),
            endpoint,
        })
    }
}

impl FiveSimClient {
    /// Create a new client against a custom endpoint.
    pub fn new(endpoint: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self> {
        let url = parse_base_url(endpoint.as_ref())?;
        Self::builder(api_key).endpoint(url).build()
    }

    /// Create a new client with the default API URL.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> FiveSimClientBuilder {
        FiveSimClientBuilder::new(api_key)
    }

    pub(crate) fn observer(&self) -> &Observer {
        self.transport.observer()
    }

    fn authorize(&self, request: ApiRequest) -> ApiRequest {
        request
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Accept", "application/json")
    }

    fn get(&self, segments: &[&str]) -> std::result::Result<ApiRequest, RequestError> {
        let url = endpoint_url(&self.endpoint, segments)?;
        Ok(self.authorize(ApiRequest::get(url)))
    }

    /// Account balance from the user profile.
    pub async fn get_balance(&self) -> Result<f64> {
        let value = self.transport.send(self.get(&["user", "profile"])?).await?;
        reject_text(PROVIDER, &value)?;

        let profile: ProfileResponse = decode_as(PROVIDER, value)?;
        profile
            .balance
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `balance` field").into())
    }

    /// Buy a hosting (rent) number.
    pub async fn buy_hosting(&self, country: &str, product: &str) -> Result<BuyResponse> {
        let url = endpoint_url(&self.endpoint, &["user", "buy", "hosting", country, product])?;
        let value = self.transport.send(self.authorize(ApiRequest::post(url))).await?;

        if let Some(text) = text_response(&value) {
            return Err(match Refusal::from_text(text) {
                Some(Refusal::NoFreePhones) => SmsError::NoNumber { provider: PROVIDER },
                Some(Refusal::NotEnoughBalance) => SmsError::Balance { provider: PROVIDER },
                None => RequestError::vendor(PROVIDER, text.trim()).into(),
            });
        }

        decode_as(PROVIDER, value).map_err(Into::into)
    }

    /// Order details including received messages.
    pub async fn check_order(&self, id: &OrderId) -> Result<CheckResponse> {
        let value = self
            .transport
            .send(self.get(&["user", "check", id.as_str()])?)
            .await?;
        reject_text(PROVIDER, &value)?;

        decode_as(PROVIDER, value).map_err(Into::into)
    }

    /// Finish an order.
    pub async fn finish_order(&self, id: &OrderId) -> Result<()> {
        self.transport
            .send(self.get(&["user", "finish", id.as_str()])?)
            .await?;
        Ok(())
    }
}
