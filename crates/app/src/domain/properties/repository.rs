//! Properties Repository

use async_trait::async_trait;
use hearth::bookings::PropertyUuid;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::domain::properties::{
    errors::PropertiesError,
    models::{NewProperty, Property},
};

/// In-memory properties store.
#[derive(Debug, Default)]
pub struct InMemoryPropertiesRepository {
    properties: RwLock<FxHashMap<PropertyUuid, Property>>,
}

impl InMemoryPropertiesRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertiesRepository for InMemoryPropertiesRepository {
    async fn create_property(
        &self,
        property: NewProperty,
        now: Timestamp,
    ) -> Result<Property, PropertiesError> {
        ensure_positive_rate(property.nightly_rate)?;

        let mut properties = self.properties.write().await;

        if properties.contains_key(&property.uuid) {
            return Err(PropertiesError::AlreadyExists);
        }

        let created = Property {
            uuid: property.uuid,
            host: property.host,
            title: property.title,
            nightly_rate: property.nightly_rate,
            max_guests: property.max_guests,
            created_at: now,
            updated_at: now,
        };

        properties.insert(created.uuid, created.clone());

        Ok(created)
    }

    async fn get_property(&self, property: PropertyUuid) -> Result<Property, PropertiesError> {
        self.properties
            .read()
            .await
            .get(&property)
            .cloned()
            .ok_or(PropertiesError::NotFound)
    }

    async fn update_nightly_rate(
        &self,
        property: PropertyUuid,
        nightly_rate: Decimal,
        now: Timestamp,
    ) -> Result<Property, PropertiesError> {
        ensure_positive_rate(nightly_rate)?;

        let mut properties = self.properties.write().await;

        let stored = properties
            .get_mut(&property)
            .ok_or(PropertiesError::NotFound)?;

        stored.nightly_rate = nightly_rate;
        stored.updated_at = now;

        Ok(stored.clone())
    }
}

fn ensure_positive_rate(nightly_rate: Decimal) -> Result<(), PropertiesError> {
    if nightly_rate <= Decimal::ZERO {
        return Err(PropertiesError::InvalidRate(nightly_rate));
    }

    Ok(())
}

/// Property listings, as far as pricing needs them.
#[automock]
#[async_trait]
pub trait PropertiesRepository: Send + Sync {
    /// Create a property listing.
    async fn create_property(
        &self,
        property: NewProperty,
        now: Timestamp,
    ) -> Result<Property, PropertiesError>;

    /// Retrieve a single property.
    async fn get_property(&self, property: PropertyUuid) -> Result<Property, PropertiesError>;

    /// Change a property's nightly rate. Existing bookings keep their price snapshot.
    async fn update_nightly_rate(
        &self,
        property: PropertyUuid,
        nightly_rate: Decimal,
        now: Timestamp,
    ) -> Result<Property, PropertiesError>;
}
