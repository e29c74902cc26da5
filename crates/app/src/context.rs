//! Application context.
//!
//! Wires the in-memory stores, the payment gateway and the configured policies into a bookings
//! service. A persistent store adapter would be swapped in here.

use std::sync::Arc;

use hearth::{payments::PaymentSecret, policies::Policies};

use crate::{
    config::{AppConfig, ConfigError},
    domain::{
        bookings::{BookingsRepository, InMemoryBookingsRepository, StoreBookingsService},
        coupons::{CouponsRepository, InMemoryCouponsRepository},
        properties::{InMemoryPropertiesRepository, PropertiesRepository},
    },
    gateway::{HttpPaymentGateway, PaymentGateway},
};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Property listings
    pub properties: Arc<InMemoryPropertiesRepository>,

    /// Bookings
    pub bookings: Arc<InMemoryBookingsRepository>,

    /// Coupons
    pub coupons: Arc<InMemoryCouponsRepository>,

    /// Booking lifecycle service
    pub service: StoreBookingsService,
}

impl AppContext {
    /// Build the context from configuration, connecting to the HTTP payment gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy file is invalid, the gateway credentials are missing or
    /// the gateway client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let policies = config.load_policies()?;
        let payment_secret = config.payment_secret()?;
        let gateway = HttpPaymentGateway::new(config.payments.gateway()?)?;

        Ok(Self::with_gateway(
            policies,
            payment_secret,
            Arc::new(gateway),
        ))
    }

    /// Build the context around an existing gateway.
    #[must_use]
    pub fn with_gateway(
        policies: Policies,
        payment_secret: Option<PaymentSecret>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let properties = Arc::new(InMemoryPropertiesRepository::new());
        let bookings = Arc::new(InMemoryBookingsRepository::new());
        let coupons = Arc::new(InMemoryCouponsRepository::new());

        let properties_store: Arc<dyn PropertiesRepository> = properties.clone();
        let bookings_store: Arc<dyn BookingsRepository> = bookings.clone();
        let coupons_store: Arc<dyn CouponsRepository> = coupons.clone();

        let service = StoreBookingsService::new(
            properties_store,
            bookings_store,
            coupons_store,
            gateway,
            policies,
            payment_secret,
        );

        Self {
            properties,
            bookings,
            coupons,
            service,
        }
    }
}
