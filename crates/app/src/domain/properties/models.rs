//! Property Models

use hearth::bookings::{PropertyUuid, UserUuid};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Property Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property identifier
    pub uuid: PropertyUuid,

    /// Host who lists the property
    pub host: UserUuid,

    /// Listing title
    pub title: String,

    /// Current nightly rate, in major currency units
    pub nightly_rate: Decimal,

    /// Most guests the property sleeps, infants included
    pub max_guests: u32,

    /// Creation time
    pub created_at: Timestamp,

    /// Last update time
    pub updated_at: Timestamp,
}

/// New Property Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProperty {
    /// Property identifier
    pub uuid: PropertyUuid,

    /// Host who lists the property
    pub host: UserUuid,

    /// Listing title
    pub title: String,

    /// Nightly rate
    pub nightly_rate: Decimal,

    /// Most guests the property sleeps
    pub max_guests: u32,
}
