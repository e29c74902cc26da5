//! Application configuration
//!
//! Settings come from command-line flags with environment fallbacks; a `.env` file is loaded
//! first when present.

use clap::Args;
use hearth::{
    payments::{PaymentConfigError, PaymentSecret},
    policies::{Policies, PolicyError},
};
use thiserror::Error;

use crate::{config::observability::LoggingConfig, gateway::GatewayError};

pub mod observability;
pub mod payments;
pub mod policies;

pub use observability::LogFormat;
pub use payments::PaymentsConfig;
pub use policies::PolicyConfig;

/// Errors raised while turning configuration into running collaborators.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The policy file could not be loaded.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The payment secret is unusable.
    #[error(transparent)]
    Payment(#[from] PaymentConfigError),

    /// A setting needed for this operation was not provided.
    #[error("missing setting: {0}")]
    Missing(&'static str),

    /// The gateway client could not be built.
    #[error("failed to build payment gateway client: {0}")]
    Gateway(#[from] GatewayError),
}

/// Hearth application configuration
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Pricing and refund policy settings.
    #[command(flatten)]
    pub policies: PolicyConfig,

    /// Payment gateway settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,
}

impl AppConfig {
    /// Load the configured policies, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy file cannot be read or is invalid.
    pub fn load_policies(&self) -> Result<Policies, ConfigError> {
        Ok(self.policies.load()?)
    }

    /// The payment verification secret, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentConfigError::EmptySecret`] if the secret is set but empty.
    pub fn payment_secret(&self) -> Result<Option<PaymentSecret>, ConfigError> {
        Ok(self.payments.secret()?)
    }
}
