//! Vak-SMS HTTP client.

use super::types::{BalanceResponse, GetNumberResponse, GetSmsCodeResponse, SetStatus, VakErrorCode};
use crate::errors::{RequestError, Result, SmsError};
use crate::observer::{EventHook, Observer};
use crate::transport::{
    ApiRequest, HttpTransport, decode_as, endpoint_url, parse_base_url, reject_text,
};
use crate::types::{OrderId, ProviderKind};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Default Vak-SMS API URL.
pub const DEFAULT_API_URL: &str = "https://vak-sms.com/api";

const PROVIDER: ProviderKind = ProviderKind::VakSms;

/// Vak-SMS HTTP client.
#[derive(Clone)]
pub struct VakSmsClient {
    transport: HttpTransport,
    api_key: SecretString,
    endpoint: Url,
}

impl std::fmt::Debug for VakSmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VakSmsClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Builder for configuring a [`VakSmsClient`].
pub struct VakSmsClientBuilder {
    api_key: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    hook: Option<EventHook>,
}

impl VakSmsClientBuilder {
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

    /// Build the [`VakSmsClient`].
    pub fn build(self) -> Result<VakSmsClient> {
        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None => parse_base_url(DEFAULT_API_URL)?,
        };

        Ok(VakSmsClient {
            transport: HttpTransport::new(PROVIDER, self.http_client, self.hook)?,
            api_key: SecretString::from(self.api_key),
            endpoint,
        })
    }
}

impl VakSmsClient {
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
    pub fn builder(api_key: impl Into<String>) -> VakSmsClientBuilder {
        VakSmsClientBuilder::new(api_key)
    }

    pub(crate) fn observer(&self) -> &Observer {
        self.transport.observer()
    }

    /// Vak-SMS paths end with a slash.
    fn request(&self, action: &str) -> std::result::Result<ApiRequest, RequestError> {
        let url = endpoint_url(&self.endpoint, &[action, ""])?;
        Ok(ApiRequest::get(url).query("apiKey", self.api_key.expose_secret()))
    }

    /// Account balance.
    pub async fn get_balance(&self) -> Result<f64> {
        let value = self.transport.send(self.request("getBalance")?).await?;
        reject_text(PROVIDER, &value)?;

        let response: BalanceResponse = decode_as(PROVIDER, value)?;
        if let Some(error) = response.error.filter(|e| !e.is_empty()) {
            return Err(RequestError::vendor(PROVIDER, error).into());
        }

        response
            .balance
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `balance` field").into())
    }

    /// Rent a number. Returns `(idNum, tel)`.
    pub async fn get_number(&self, country: &str, service: &str) -> Result<(String, String)> {
        let request = self
            .request("getNumber")?
            .query("service", service)
            .query("country", country)
            .query("rent", "true");

        let value = self.transport.send(request).await?;
        reject_text(PROVIDER, &value)?;

        let response: GetNumberResponse = decode_as(PROVIDER, value)?;
        let Some(id_num) = response.id_num else {
            return Err(match response.error {
                Some(raw) => rent_error(VakErrorCode::from_raw(&raw)),
                None => RequestError::unexpected(PROVIDER, "missing `idNum` field").into(),
            });
        };
        let tel = response
            .tel
            .ok_or_else(|| RequestError::unexpected(PROVIDER, "missing `tel` field"))?;

        Ok((id_num, tel))
    }

    /// Latest code on a rental, if any.
    pub async fn get_sms_code(&self, id_num: &OrderId) -> Result<Option<String>> {
        let request = self.request("getSmsCode")?.query("idNum", id_num);

        let value = self.transport.send(request).await?;
        reject_text(PROVIDER, &value)?;

        let response: GetSmsCodeResponse = decode_as(PROVIDER, value)?;
        if let Some(raw) = response.error.filter(|e| !e.is_empty()) {
            match VakErrorCode::from_raw(&raw) {
                VakErrorCode::Wait => return Ok(None),
                code => return Err(RequestError::vendor(PROVIDER, code.to_string()).into()),
            }
        }

        Ok(response.sms_code.filter(|c| !c.trim().is_empty()))
    }

    /// Change the rental status.
    pub async fn set_status(&self, id_num: &OrderId, status: SetStatus) -> Result<()> {
        let request = self
            .request("setStatus")?
            .query("idNum", id_num)
            .query("status", status.code());

        self.transport.send(request).await?;
        Ok(())
    }
}

fn rent_error(code: VakErrorCode) -> SmsError {
    #[cfg(feature = "tracing")]
    warn!(code = %code, "Vak-SMS refused to rent a number");

    match code {
        VakErrorCode::NoNumbers => SmsError::NoNumber { provider: PROVIDER },
        VakErrorCode::NoBalance => SmsError::Balance { provider: PROVIDER },
        code => RequestError::vendor(PROVIDER, code.to_string()).into(),
    }
}
