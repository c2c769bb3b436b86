//! One-shot HTTP helper shared by all providers.
//!
//! Issues a single request, normalizes the body into a [`serde_json::Value`]
//! and folds every transport or HTTP-status failure into [`RequestError`].
//! There is no retry logic here; see [`crate::RetryableProvider`].

use crate::errors::RequestError;
use crate::observer::{EventHook, Observer, SmsEvent};
use crate::types::ProviderKind;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug, error};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Key under which a non-JSON body is returned.
pub const TEXT_RESPONSE_KEY: &str = "text_response";

/// Per-request timeout of the default HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Description of a single vendor call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    /// Start a request with an arbitrary method.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// URL path, safe to log.
    pub fn endpoint(&self) -> &str {
        self.url.path()
    }
}

/// HTTP helper bound to one provider.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    provider: ProviderKind,
    http_client: ClientWithMiddleware,
    observer: Observer,
}

impl HttpTransport {
    /// Create a transport, building a default client when none is supplied.
    pub fn new(
        provider: ProviderKind,
        http_client: Option<ClientWithMiddleware>,
        hook: Option<EventHook>,
    ) -> Result<Self, RequestError> {
        let http_client = match http_client {
            Some(client) => client,
            None => {
                let client = reqwest::Client::builder()
                    .timeout(DEFAULT_REQUEST_TIMEOUT)
                    .build()
                    .map_err(RequestError::BuildHttpClient)?;
                ClientBuilder::new(client).build()
            }
        };

        Ok(Self {
            provider,
            http_client,
            observer: Observer::new(hook),
        })
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub(crate) fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Perform the request and return the decoded body.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HttpTransport::send",
            skip_all,
            fields(provider = %self.provider, method = %request.method, endpoint = %request.endpoint())
        )
    )]
    pub async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let endpoint = request.endpoint().to_string();

        self.observer.emit(SmsEvent::RequestSent {
            provider: self.provider,
            method: request.method.to_string(),
            endpoint: endpoint.clone(),
        });

        let mut builder = self.http_client.request(request.method, request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = RequestError::Transport(strip_url(e));
                self.report_failure(&endpoint, &err);
                return Err(err);
            }
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        self.observer.emit(SmsEvent::ResponseReceived {
            provider: self.provider,
            endpoint: endpoint.clone(),
            status,
        });

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let err = RequestError::ReadBody(e.without_url());
                self.report_failure(&endpoint, &err);
                return Err(err);
            }
        };

        if status >= 400 {
            let err = RequestError::HttpStatus { status, body: text };
            self.report_failure(&endpoint, &err);
            return Err(err);
        }

        let value = match decode_body(content_type.as_deref(), text) {
            Ok(value) => value,
            Err(err) => {
                self.report_failure(&endpoint, &err);
                return Err(err);
            }
        };

        #[cfg(feature = "tracing")]
        {
            debug!(status, "Response received");
            Span::current().set_status(Status::Ok);
        }

        Ok(value)
    }

    fn report_failure(&self, endpoint: &str, err: &RequestError) {
        #[cfg(feature = "tracing")]
        {
            error!(error = %err, "Request failed");
            Span::current().set_status(Status::error(err.to_string()));
        }

        self.observer.emit(SmsEvent::RequestFailed {
            provider: self.provider,
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        });
    }
}

/// Drop the request URL from a client error; its query string may carry
/// the API key.
fn strip_url(err: reqwest_middleware::Error) -> reqwest_middleware::Error {
    match err {
        reqwest_middleware::Error::Reqwest(e) => {
            reqwest_middleware::Error::Reqwest(e.without_url())
        }
        other => other,
    }
}

/// Normalize a response body.
///
/// Declared JSON must parse. Anything else gets a best-effort parse and
/// falls back to `{"text_response": <body>}`.
pub(crate) fn decode_body(content_type: Option<&str>, text: String) -> Result<Value, RequestError> {
    let declared_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    if declared_json {
        return serde_json::from_str(&text).map_err(RequestError::DecodeJson);
    }

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(serde_json::json!({ TEXT_RESPONSE_KEY: text })),
    }
}

/// Raw text of a body that was not JSON.
pub(crate) fn text_response(value: &Value) -> Option<&str> {
    value.get(TEXT_RESPONSE_KEY).and_then(Value::as_str)
}

/// A bare-text body where JSON was expected carries the vendor's complaint.
pub(crate) fn reject_text(provider: ProviderKind, value: &Value) -> Result<(), RequestError> {
    match text_response(value) {
        Some(text) => Err(RequestError::vendor(provider, text.trim())),
        None => Ok(()),
    }
}

/// Deserialize a decoded body into a typed vendor response.
pub(crate) fn decode_as<T: DeserializeOwned>(
    provider: ProviderKind,
    value: Value,
) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(|e| RequestError::unexpected(provider, e.to_string()))
}

/// Append path segments to a base URL.
///
/// An empty trailing segment yields a trailing slash, which some vendors
/// require.
pub(crate) fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, RequestError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RequestError::InvalidUrl {
            url: base.to_string(),
            message: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Parse a configured base URL.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, RequestError> {
    Url::parse(raw).map_err(|e| RequestError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> HttpTransport {
        HttpTransport::new(ProviderKind::SmsMan, None, None).unwrap()
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_json_body_is_parsed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/balance"))
            .and(query_param("token", "secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"balance": "10.5"})),
            )
            .mount(&mock_server)
            .await;

        let value = transport()
            .send(ApiRequest::get(url(&mock_server, "/balance")).query("token", "secret"))
            .await
            .unwrap();

        assert_eq!(value["balance"], "10.5");
    }

    #[tokio::test]
    async fn test_headers_and_body_are_forwarded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/buy"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1})))
            .mount(&mock_server)
            .await;

        let value = transport()
            .send(
                ApiRequest::post(url(&mock_server, "/buy"))
                    .header("Authorization", "Bearer abc")
                    .json(serde_json::json!({"x": 1})),
            )
            .await
            .unwrap();

        assert_eq!(value["id"], 1);
    }

    #[tokio::test]
    async fn test_plain_text_is_wrapped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("no free phones"))
            .mount(&mock_server)
            .await;

        let value = transport()
            .send(ApiRequest::get(url(&mock_server, "/x")))
            .await
            .unwrap();

        assert_eq!(text_response(&value), Some("no free phones"));
    }

    #[tokio::test]
    async fn test_json_text_without_json_content_type_is_parsed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"smsCode": "555"}"#))
            .mount(&mock_server)
            .await;

        let value = transport()
            .send(ApiRequest::get(url(&mock_server, "/x")))
            .await
            .unwrap();

        assert_eq!(value["smsCode"], "555");
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&mock_server)
            .await;

        let err = transport()
            .send(ApiRequest::get(url(&mock_server, "/x")))
            .await
            .unwrap_err();

        match err {
            RequestError::HttpStatus { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad token");
            }
            other => panic!("Expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_declared_json_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let err = transport()
            .send(ApiRequest::get(url(&mock_server, "/x")))
            .await
            .unwrap_err();

        assert!(matches!(err, RequestError::DecodeJson(_)));
    }

    #[tokio::test]
    async fn test_invalid_declared_json_reports_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{not json", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = HttpTransport::new(
            ProviderKind::FiveSim,
            None,
            Some(Arc::new(move |e: &SmsEvent| sink.lock().unwrap().push(e.clone()))),
        )
        .unwrap();

        assert!(transport.send(ApiRequest::get(url(&mock_server, "/x"))).await.is_err());

        let seen = seen.lock().unwrap();
        assert!(matches!(
            seen.last(),
            Some(SmsEvent::RequestFailed { endpoint, .. }) if endpoint == "/x"
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let dead = Url::parse(&format!("http://127.0.0.1:{port}/x")).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = HttpTransport::new(
            ProviderKind::VakSms,
            None,
            Some(Arc::new(move |e: &SmsEvent| sink.lock().unwrap().push(e.clone()))),
        )
        .unwrap();

        let err = transport.send(ApiRequest::get(dead)).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
        assert!(err.to_string().starts_with("Network error"));

        let seen = seen.lock().unwrap();
        assert!(matches!(seen[0], SmsEvent::RequestSent { .. }));
        assert!(matches!(seen.last(), Some(SmsEvent::RequestFailed { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_hides_query_secrets() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let dead = Url::parse(&format!("http://127.0.0.1:{port}/control/get-balance")).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = HttpTransport::new(
            ProviderKind::SmsMan,
            None,
            Some(Arc::new(move |e: &SmsEvent| sink.lock().unwrap().push(e.clone()))),
        )
        .unwrap();

        let err = transport
            .send(ApiRequest::get(dead).query("token", "SUPERSECRET"))
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("SUPERSECRET"), "leaked: {err}");
        assert!(!format!("{err:?}").contains("SUPERSECRET"));

        let seen = seen.lock().unwrap();
        for event in seen.iter() {
            assert!(!event.to_string().contains("SUPERSECRET"), "leaked: {event}");
        }
        match seen.last() {
            Some(SmsEvent::RequestFailed { message, .. }) => {
                assert!(!message.contains("SUPERSECRET"));
            }
            other => panic!("Expected RequestFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_reject_text_maps_plain_body_to_vendor_error() {
        let value = serde_json::json!({ TEXT_RESPONSE_KEY: " no free phones\n" });
        let err = reject_text(ProviderKind::FiveSim, &value).unwrap_err();
        assert!(matches!(
            err,
            RequestError::Vendor { ref message, .. } if message == "no free phones"
        ));

        assert!(reject_text(ProviderKind::FiveSim, &serde_json::json!({"id": 1})).is_ok());
    }

    #[test]
    fn test_endpoint_url_segments() {
        let base = Url::parse("https://vak-sms.com/api").unwrap();
        let url = endpoint_url(&base, &["getBalance", ""]).unwrap();
        assert_eq!(url.as_str(), "https://vak-sms.com/api/getBalance/");

        let base = Url::parse("https://5sim.net/v1/").unwrap();
        let url = endpoint_url(&base, &["user", "check", "12"]).unwrap();
        assert_eq!(url.as_str(), "https://5sim.net/v1/user/check/12");
    }

    #[test]
    fn test_decode_body_fallbacks() {
        let v = decode_body(Some("text/html"), "OK".to_string()).unwrap();
        assert_eq!(text_response(&v), Some("OK"));

        let v = decode_body(None, "[]".to_string()).unwrap();
        assert!(v.as_array().unwrap().is_empty());
    }
}
