//! HTTP payment gateway client.

use std::time::Duration;

use async_trait::async_trait;
use hearth::payments::PaymentSecret;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::gateway::{GatewayError, GatewayOrder, GatewayRefund, PaymentGateway};

/// Configuration for connecting to the payment gateway.
#[derive(Debug, Clone)]
pub struct HttpPaymentGatewayConfig {
    /// Gateway API base URL, e.g. `"https://api.razorpay.com"`.
    pub base_url: String,

    /// Merchant key id, sent as the basic-auth user.
    pub key_id: String,

    /// Merchant key secret, sent as the basic-auth password.
    pub key_secret: PaymentSecret,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// Payment gateway client speaking the gateway's JSON API over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    config: HttpPaymentGatewayConfig,
    http: Client,
}

impl HttpPaymentGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpPaymentGatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<Response, GatewayError> {
        let response = self
            .http
            .post(url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(GatewayError::Rejected { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[tracing::instrument(
        name = "gateway.http.create_order",
        skip(self),
        fields(order_id = tracing::field::Empty),
        err
    )]
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let body = json!({
            "amount": amount_minor,
            "currency": currency,
            "receipt": receipt,
        });

        let order: GatewayOrder = self.post(&self.url("/v1/orders"), body).await?.json().await?;

        if order.amount != amount_minor {
            return Err(GatewayError::UnexpectedResponse(format!(
                "order {} created for {} instead of {amount_minor}",
                order.id, order.amount
            )));
        }

        tracing::Span::current().record("order_id", tracing::field::display(&order.id));

        info!(order_id = %order.id, "created gateway order");

        Ok(order)
    }

    #[tracing::instrument(name = "gateway.http.refund", skip(self), err)]
    async fn refund(
        &self,
        payment_id: &str,
        amount_minor: i64,
    ) -> Result<GatewayRefund, GatewayError> {
        if !is_gateway_id(payment_id) {
            return Err(GatewayError::UnexpectedResponse(format!(
                "refusing to refund malformed payment id {payment_id:?}"
            )));
        }

        let url = self.url(&format!("/v1/payments/{payment_id}/refund"));
        let body = json!({ "amount": amount_minor });

        let refund: RefundResponse = self.post(&url, body).await?.json().await?;

        if refund.status.as_deref() == Some("failed") {
            return Err(GatewayError::UnexpectedResponse(format!(
                "refund {} failed",
                refund.id
            )));
        }

        info!(refund_id = %refund.id, "gateway confirmed refund");

        Ok(GatewayRefund {
            id: refund.id,
            payment_id: refund.payment_id,
            amount: refund.amount,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
    payment_id: String,
    amount: i64,
    #[serde(default)]
    status: Option<String>,
}

fn is_gateway_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn gateway(base_url: &str) -> TestResult<HttpPaymentGateway> {
        Ok(HttpPaymentGateway::new(HttpPaymentGatewayConfig {
            base_url: base_url.to_string(),
            key_id: "rzp_test_key".to_string(),
            key_secret: PaymentSecret::new("rzp_test_secret")?,
            timeout: Duration::from_secs(2),
        })?)
    }

    #[test]
    fn url_joins_without_double_slash() -> TestResult {
        let gateway = gateway("https://gateway.test/")?;

        assert_eq!(gateway.url("/v1/orders"), "https://gateway.test/v1/orders");

        Ok(())
    }

    #[test]
    fn debug_output_redacts_key_secret() -> TestResult {
        let rendered = format!("{:?}", gateway("https://gateway.test")?);

        assert!(
            !rendered.contains("rzp_test_secret"),
            "secret leaked: {rendered}"
        );

        Ok(())
    }

    #[test]
    fn gateway_ids_are_restricted_to_safe_characters() {
        assert!(is_gateway_id("pay_29QQoUBi66xm2f"));
        assert!(!is_gateway_id(""));
        assert!(!is_gateway_id("pay/../orders"));
    }

    #[tokio::test]
    async fn malformed_payment_id_is_refused_before_sending() -> TestResult {
        let result = gateway("https://gateway.test")?
            .refund("pay/../orders", 100)
            .await;

        assert!(
            matches!(result, Err(GatewayError::UnexpectedResponse(_))),
            "expected UnexpectedResponse, got {result:?}"
        );

        Ok(())
    }
}
