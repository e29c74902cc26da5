//! Payment Gateway
//!
//! Orders are created before the traveler pays; refunds are executed against a captured payment.
//! Amounts cross this boundary as integer minor units.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

pub mod errors;
pub mod http;

pub use errors::GatewayError;
pub use http::{HttpPaymentGateway, HttpPaymentGatewayConfig};

/// Order created at the gateway for a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order identifier
    pub id: String,

    /// Amount in minor units
    pub amount: i64,

    /// ISO currency code
    pub currency: String,

    /// Merchant receipt reference
    #[serde(default)]
    pub receipt: Option<String>,
}

/// Refund confirmed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRefund {
    /// Gateway refund identifier
    pub id: String,

    /// Payment the refund was issued against
    pub payment_id: String,

    /// Amount refunded, in minor units
    pub amount: i64,
}

/// External payment provider.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order the traveler will pay against.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Refund part or all of a captured payment.
    ///
    /// Returns only once the gateway has confirmed the refund.
    async fn refund(
        &self,
        payment_id: &str,
        amount_minor: i64,
    ) -> Result<GatewayRefund, GatewayError>;
}
