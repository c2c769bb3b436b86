//! Vak-SMS provider implementation.

use super::client::VakSmsClient;
use super::types::SetStatus;
use crate::errors::Result;
use crate::observer::SmsEvent;
use crate::order::Order;
use crate::providers::traits::SmsProvider;
use crate::types::{OrderId, ProviderKind, SmsCode};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

const PROVIDER: ProviderKind = ProviderKind::VakSms;

/// Vak-SMS provider.
///
/// Rentals are requested with `rent=true` and the vendor decides the
/// period, so the duration argument is ignored. The vendor only reports
/// the code, which doubles as the message text.
#[derive(Debug, Clone)]
pub struct VakSmsProvider {
    client: VakSmsClient,
}

impl VakSmsProvider {
    pub fn new(client: VakSmsClient) -> Self {
        Self { client }
    }

    /// Get reference to the inner client.
    pub fn client(&self) -> &VakSmsClient {
        &self.client
    }
}

impl SmsProvider for VakSmsProvider {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "VakSmsProvider::get_balance", skip_all)
    )]
    async fn get_balance(&self) -> Result<f64> {
        self.client.get_balance().await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "VakSmsProvider::rent_number",
            skip_all,
            fields(country = %country, service = %service)
        )
    )]
    async fn rent_number(
        &self,
        country: &str,
        service: &str,
        _duration_hours: Option<u32>,
    ) -> Result<Order> {
        let (id_num, tel) = self.client.get_number(country, service).await?;
        let order = Order::new(id_num, tel, country, service, PROVIDER);

        #[cfg(feature = "tracing")]
        info!(order_id = %order.order_id(), "Number rented");

        self.client.observer().emit(SmsEvent::NumberRented {
            provider: PROVIDER,
            order_id: order.order_id().clone(),
        });

        Ok(order)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "VakSmsProvider::check_sms",
            skip_all,
            fields(order_id = %order.order_id())
        )
    )]
    async fn check_sms(&self, order: &mut Order) -> Result<()> {
        if let Some(code) = self.client.get_sms_code(order.order_id()).await? {
            #[cfg(feature = "tracing")]
            debug!("Code received");

            order.record_sms(Some(SmsCode::new(code.clone())), Some(code));
        }

        Ok(())
    }

    async fn cancel_rent(&self, order_id: &OrderId) -> Result<bool> {
        self.client.set_status(order_id, SetStatus::End).await?;

        #[cfg(feature = "tracing")]
        debug!(order_id = %order_id, "Rental ended");

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{RequestError, SmsError};
    use crate::order::OrderStatus;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_provider(mock_server: &MockServer) -> VakSmsProvider {
        let client = VakSmsClient::new(format!("{}/api", mock_server.uri()), "vak_key").unwrap();
        VakSmsProvider::new(client)
    }

    fn waiting_order() -> Order {
        Order::new("3adb61376b8f", "79991112233", "ru", "tg", PROVIDER)
    }

    async fn mount_get_number(mock_server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/getNumber/"))
            .and(query_param("rent", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_rent_number() {
        let mock_server = MockServer::start().await;
        mount_get_number(
            &mock_server,
            serde_json::json!({"tel": 79991112233u64, "idNum": "3adb61376b8f"}),
        )
        .await;

        let provider = create_test_provider(&mock_server);
        let order = provider.rent_number("ru", "tg", Some(12)).await.unwrap();

        assert_eq!(order.order_id().as_str(), "3adb61376b8f");
        assert_eq!(order.phone_number().as_str(), "79991112233");
        assert_eq!(order.provider(), ProviderKind::VakSms);
        assert_eq!(order.status(), OrderStatus::Waiting);
    }

    #[tokio::test]
    async fn test_rent_number_no_balance() {
        let mock_server = MockServer::start().await;
        mount_get_number(&mock_server, serde_json::json!({"error": "no_balance"})).await;

        let provider = create_test_provider(&mock_server);
        let err = provider.rent_number("ru", "tg", None).await.unwrap_err();
        assert!(matches!(
            err,
            SmsError::Balance {
                provider: ProviderKind::VakSms
            }
        ));
    }

    #[tokio::test]
    async fn test_rent_number_no_numbers() {
        let mock_server = MockServer::start().await;
        mount_get_number(&mock_server, serde_json::json!({"error": "no_numbers"})).await;

        let provider = create_test_provider(&mock_server);
        let err = provider.rent_number("ru", "tg", None).await.unwrap_err();
        assert!(matches!(err, SmsError::NoNumber { .. }));
    }

    #[tokio::test]
    async fn test_rent_number_other_error() {
        let mock_server = MockServer::start().await;
        mount_get_number(&mock_server, serde_json::json!({"error": "badService"})).await;

        let provider = create_test_provider(&mock_server);
        let err = provider.rent_number("ru", "tg", None).await.unwrap_err();
        match err {
            SmsError::Request(RequestError::Vendor { message, .. }) => {
                assert_eq!(message, "badService")
            }
            other => panic!("Expected vendor error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rent_number_missing_keys_is_unexpected() {
        let mock_server = MockServer::start().await;
        mount_get_number(&mock_server, serde_json::json!({})).await;

        let provider = create_test_provider(&mock_server);
        let err = provider.rent_number("ru", "tg", None).await.unwrap_err();
        assert!(matches!(
            err,
            SmsError::Request(RequestError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_rent_number_missing_tel_is_unexpected() {
        let mock_server = MockServer::start().await;
        mount_get_number(&mock_server, serde_json::json!({"idNum": "3adb61376b8f"})).await;

        let provider = create_test_provider(&mock_server);
        let err = provider.rent_number("ru", "tg", None).await.unwrap_err();
        match err {
            SmsError::Request(RequestError::UnexpectedResponse { message, .. }) => {
                assert!(message.contains("tel"), "got {message}")
            }
            other => panic!("Expected unexpected-response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_sms_code_is_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/getSmsCode/"))
            .and(query_param("idNum", "3adb61376b8f"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"smsCode": "1234"})),
            )
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        let mut order = waiting_order();
        provider.check_sms(&mut order).await.unwrap();

        assert_eq!(order.status(), OrderStatus::Received);
        assert_eq!(order.sms_code().unwrap().as_str(), "1234");
        assert_eq!(order.sms_text(), Some("1234"));
    }

    #[tokio::test]
    async fn test_check_sms_null_code_stays_waiting() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/getSmsCode/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"smsCode": null})),
            )
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        let mut order = waiting_order();
        provider.check_sms(&mut order).await.unwrap();

        assert_eq!(order.status(), OrderStatus::Waiting);
        assert!(order.sms_code().is_none());
    }

    #[tokio::test]
    async fn test_check_sms_keeps_captured_code() {
        for later in [
            serde_json::json!({"smsCode": null}),
            serde_json::json!({"error": "wait"}),
        ] {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/api/getSmsCode/"))
                .respond_with(ResponseTemplate::new(200).set_body_json(later))
                .mount(&mock_server)
                .await;

            let provider = create_test_provider(&mock_server);
            let mut order = waiting_order();
            order.record_sms(Some(SmsCode::new("1234")), Some("1234".into()));
            let before = order.clone();

            provider.check_sms(&mut order).await.unwrap();

            assert_eq!(order, before);
            assert_eq!(order.status(), OrderStatus::Received);
            assert_eq!(order.sms_code().unwrap().as_str(), "1234");
            assert_eq!(order.sms_text(), Some("1234"));
        }
    }

    #[tokio::test]
    async fn test_cancel_rent_sets_end() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/setStatus/"))
            .and(query_param("idNum", "3adb61376b8f"))
            .and(query_param("status", "end"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "update"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        assert!(
            provider
                .cancel_rent(&OrderId::from("3adb61376b8f"))
                .await
                .unwrap()
        );
    }
}
