//! Runtime provider selection.

use super::traits::SmsProvider;
use crate::errors::{Result, SmsError};
use crate::observer::EventHook;
use crate::order::Order;
use crate::types::{OrderId, ProviderKind};
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

#[cfg(feature = "five-sim")]
use super::five_sim::{FiveSimClient, FiveSimProvider};
#[cfg(feature = "sms-man")]
use super::sms_man::{SmsManClient, SmsManProvider};
#[cfg(feature = "vak-sms")]
use super::vak_sms::{VakSmsClient, VakSmsProvider};

/// One of the compiled-in providers, chosen by [`ProviderKind`] at runtime.
///
/// ```rust,ignore
/// use sms_rental::{AnyProvider, ProviderKind, SmsProvider};
///
/// let provider = AnyProvider::new("5sim".parse::<ProviderKind>()?, "api_key")?;
/// let balance = provider.get_balance().await?;
/// ```
#[derive(Debug, Clone)]
pub enum AnyProvider {
    #[cfg(feature = "sms-man")]
    SmsMan(SmsManProvider),
    #[cfg(feature = "five-sim")]
    FiveSim(FiveSimProvider),
    #[cfg(feature = "vak-sms")]
    VakSms(VakSmsProvider),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            #[cfg(feature = "sms-man")]
            AnyProvider::SmsMan($p) => $body,
            #[cfg(feature = "five-sim")]
            AnyProvider::FiveSim($p) => $body,
            #[cfg(feature = "vak-sms")]
            AnyProvider::VakSms($p) => $body,
        }
    };
}

impl AnyProvider {
    /// Build the provider for `kind` against its default API URL.
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Result<Self> {
        Self::builder(kind, api_key).build()
    }

    /// Create a builder for configuring the provider.
    pub fn builder(kind: ProviderKind, api_key: impl Into<String>) -> AnyProviderBuilder {
        AnyProviderBuilder::new(kind, api_key)
    }
}

/// Builder for configuring an [`AnyProvider`].
pub struct AnyProviderBuilder {
    kind: ProviderKind,
    api_key: String,
    endpoint: Option<Url>,
    http_client: Option<ClientWithMiddleware>,
    hook: Option<EventHook>,
}

impl AnyProviderBuilder {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            endpoint: None,
            http_client: None,
            hook: None,
        }
    }

    /// Override the vendor's API URL.
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

    /// Build the [`AnyProvider`].
    ///
    /// Fails with [`SmsError::Other`] when `kind` was compiled out.
    pub fn build(self) -> Result<AnyProvider> {
        match self.kind {
            #[cfg(feature = "sms-man")]
            ProviderKind::SmsMan => {
                let mut builder = SmsManClient::builder(self.api_key);
                if let Some(endpoint) = self.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(client) = self.http_client {
                    builder = builder.http_client(client);
                }
                if let Some(hook) = self.hook {
                    builder = builder.observer(hook);
                }
                Ok(AnyProvider::SmsMan(SmsManProvider::new(builder.build()?)))
            }
            #[cfg(feature = "five-sim")]
            ProviderKind::FiveSim => {
                let mut builder = FiveSimClient::builder(self.api_key);
                if let Some(endpoint) = self.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(client) = self.http_client {
                    builder = builder.http_client(client);
                }
                if let Some(hook) = self.hook {
                    builder = builder.observer(hook);
                }
                Ok(AnyProvider::FiveSim(FiveSimProvider::new(builder.build()?)))
            }
            #[cfg(feature = "vak-sms")]
            ProviderKind::VakSms => {
                let mut builder = VakSmsClient::builder(self.api_key);
                if let Some(endpoint) = self.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let Some(client) = self.http_client {
                    builder = builder.http_client(client);
                }
                if let Some(hook) = self.hook {
                    builder = builder.observer(hook);
                }
                Ok(AnyProvider::VakSms(VakSmsProvider::new(builder.build()?)))
            }
            #[allow(unreachable_patterns)]
            other => Err(SmsError::Other(format!(
                "provider `{other}` is not enabled in this build"
            ))),
        }
    }
}

impl SmsProvider for AnyProvider {
    fn kind(&self) -> ProviderKind {
        dispatch!(self, p => p.kind())
    }

    async fn get_balance(&self) -> Result<f64> {
        dispatch!(self, p => p.get_balance().await)
    }

    async fn rent_number(
        &self,
        country: &str,
        service: &str,
        duration_hours: Option<u32>,
    ) -> Result<Order> {
        dispatch!(self, p => p.rent_number(country, service, duration_hours).await)
    }

    async fn check_sms(&self, order: &mut Order) -> Result<()> {
        dispatch!(self, p => p.check_sms(order).await)
    }

    async fn cancel_rent(&self, order_id: &OrderId) -> Result<bool> {
        dispatch!(self, p => p.cancel_rent(order_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_kind_matches_selection() {
        for kind in ProviderKind::all() {
            let provider = AnyProvider::new(kind, "key").unwrap();
            assert_eq!(provider.kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_endpoint_override_routes_requests() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/getBalance/"))
            .and(query_param("apiKey", "vak_key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"balance": 7.5})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let endpoint = Url::parse(&format!("{}/api", mock_server.uri())).unwrap();
        let provider = AnyProvider::builder(ProviderKind::VakSms, "vak_key")
            .endpoint(endpoint)
            .build()
            .unwrap();

        assert_eq!(provider.get_balance().await.unwrap(), 7.5);
    }
}
