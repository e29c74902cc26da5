//! Payment Gateway Config

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    time::Duration,
};

use clap::Args;
use hearth::payments::{PaymentConfigError, PaymentSecret};

use crate::{
    config::ConfigError,
    gateway::HttpPaymentGatewayConfig,
};

/// Payment gateway settings.
#[derive(Clone, Args)]
pub struct PaymentsConfig {
    /// Payment gateway API base URL
    #[arg(
        long,
        env = "PAYMENT_GATEWAY_URL",
        default_value = "https://api.razorpay.com"
    )]
    pub payment_gateway_url: String,

    /// Merchant key id
    #[arg(long, env = "PAYMENT_KEY_ID")]
    pub payment_key_id: Option<String>,

    /// Merchant key secret, also used to verify payment signatures
    #[arg(long, env = "PAYMENT_KEY_SECRET", hide_env_values = true)]
    pub payment_key_secret: Option<String>,

    /// Gateway request timeout in seconds
    #[arg(long, env = "PAYMENT_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub payment_timeout_seconds: u64,
}

impl PaymentsConfig {
    /// The key secret, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentConfigError::EmptySecret`] if the secret is set but empty.
    pub fn secret(&self) -> Result<Option<PaymentSecret>, PaymentConfigError> {
        self.payment_key_secret
            .as_deref()
            .map(PaymentSecret::new)
            .transpose()
    }

    /// Settings for the HTTP gateway client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] unless both the key id and key secret are set.
    pub fn gateway(&self) -> Result<HttpPaymentGatewayConfig, ConfigError> {
        let key_id = self
            .payment_key_id
            .clone()
            .ok_or(ConfigError::Missing("PAYMENT_KEY_ID"))?;

        let key_secret = self.secret()?.ok_or(ConfigError::Missing("PAYMENT_KEY_SECRET"))?;

        Ok(HttpPaymentGatewayConfig {
            base_url: self.payment_gateway_url.clone(),
            key_id,
            key_secret,
            timeout: Duration::from_secs(self.payment_timeout_seconds),
        })
    }
}

impl Debug for PaymentsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PaymentsConfig")
            .field("payment_gateway_url", &self.payment_gateway_url)
            .field("payment_key_id", &self.payment_key_id)
            .field(
                "payment_key_secret",
                &self.payment_key_secret.as_ref().map(|_secret| "**redacted**"),
            )
            .field("payment_timeout_seconds", &self.payment_timeout_seconds)
            .finish()
    }
}
