//! Bookings
//!
//! A booking is one reservation of a property by a traveler. Bookings are never deleted; they
//! move between statuses, and their price snapshot is fixed when they are created.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{stays::StayWindow, uuids::TypedUuid};

/// Booking record marker
#[derive(Debug)]
pub struct BookingRecord;

/// Property record marker
#[derive(Debug)]
pub struct PropertyRecord;

/// User record marker
#[derive(Debug)]
pub struct UserRecord;

/// Booking UUID
pub type BookingUuid = TypedUuid<BookingRecord>;

/// Property UUID
pub type PropertyUuid = TypedUuid<PropertyRecord>;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// Reservation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Requested by the traveler, awaiting the host
    Pending,

    /// Accepted by the host
    Confirmed,

    /// Cancelled; terminal
    Cancelled,
}

/// Payment lifecycle state, independent of [`BookingStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No verified payment yet
    Pending,

    /// Payment verified against the gateway signature
    Paid,

    /// A refund has been issued; terminal
    Refunded,
}

/// Traveler age category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelerCategory {
    /// Adult
    Adult,

    /// Child
    Child,

    /// Infant
    Infant,
}

/// Guest counts for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Adults; at least one
    pub adults: u32,

    /// Children
    #[serde(default)]
    pub children: u32,

    /// Infants
    #[serde(default)]
    pub infants: u32,
}

impl Occupancy {
    /// Number of guests booked for `category`.
    pub const fn count(&self, category: TravelerCategory) -> u32 {
        match category {
            TravelerCategory::Adult => self.adults,
            TravelerCategory::Child => self.children,
            TravelerCategory::Infant => self.infants,
        }
    }

    /// Total number of guests.
    pub const fn total(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }
}

/// Details of one traveler on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    /// Full name
    pub name: String,

    /// Age in years
    pub age: u32,

    /// Gender, as declared
    pub gender: String,

    /// Nationality, as declared
    pub nationality: String,

    /// Age category the traveler counts against
    pub category: TravelerCategory,
}

/// Price captured when the booking was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Nightly rate of the property at booking time
    pub nightly_rate: Decimal,

    /// Nights booked
    pub total_nights: u32,

    /// Amount due for the booking, fees and discounts included
    pub total: Decimal,
}

/// A reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier
    pub uuid: BookingUuid,

    /// Property being booked
    pub property: PropertyUuid,

    /// Traveler who made the booking
    pub traveler: UserUuid,

    /// Host who owns the property
    pub host: UserUuid,

    /// Check-in and check-out dates
    pub stay: StayWindow,

    /// Guest counts
    pub occupancy: Occupancy,

    /// Traveler details, in the order they were entered
    pub travelers: Vec<Traveler>,

    /// Price fixed at creation
    pub price: PriceSnapshot,

    /// Coupon redeemed for this booking, if any
    pub coupon_code: Option<String>,

    /// Gateway order the traveler pays against
    pub order_id: Option<String>,

    /// Gateway payment captured for the order
    pub payment_id: Option<String>,

    /// Payment state
    pub payment_status: PaymentStatus,

    /// Reservation state
    pub booking_status: BookingStatus,

    /// Free-text notes
    pub notes: Option<String>,

    /// Creation time
    pub created_at: Timestamp,

    /// Last update time
    pub updated_at: Timestamp,
}

/// Invariant violations detected on a booking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    /// The recorded night count does not match the stay window.
    #[error("booking records {recorded} nights but the stay spans {expected}")]
    NightsMismatch {
        /// Nights stored on the booking
        recorded: u32,
        /// Nights implied by the stay window
        expected: u32,
    },

    /// The stay window could not be measured.
    #[error("booking stay window is invalid")]
    InvalidStay,

    /// A booking needs at least one adult.
    #[error("a booking needs at least one adult")]
    NoAdults,

    /// More travelers of a category were listed than were booked.
    #[error("{listed} {category:?} travelers listed but only {booked} booked")]
    TooManyTravelers {
        /// Category that overflowed
        category: TravelerCategory,
        /// Travelers listed in that category
        listed: u32,
        /// Guests booked in that category
        booked: u32,
    },

    /// Refunded payments are only possible on cancelled bookings.
    #[error("payment is refunded but booking is {0:?}")]
    RefundedWithoutCancellation(BookingStatus),
}

impl Booking {
    /// Whether the booking can no longer be cancelled or refunded.
    pub fn is_terminal(&self) -> bool {
        self.booking_status == BookingStatus::Cancelled
            || self.payment_status == PaymentStatus::Refunded
    }

    /// Check the booking's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`BookingError`] found.
    pub fn validate(&self) -> Result<(), BookingError> {
        let expected = self
            .stay
            .nights()
            .map_err(|_err| BookingError::InvalidStay)?;

        if self.price.total_nights != expected {
            return Err(BookingError::NightsMismatch {
                recorded: self.price.total_nights,
                expected,
            });
        }

        validate_travelers(&self.occupancy, &self.travelers)?;

        if self.payment_status == PaymentStatus::Refunded
            && self.booking_status != BookingStatus::Cancelled
        {
            return Err(BookingError::RefundedWithoutCancellation(
                self.booking_status,
            ));
        }

        Ok(())
    }
}

/// Check that occupancy has an adult and that no traveler category is over-subscribed.
///
/// # Errors
///
/// - [`BookingError::NoAdults`]: `adults` is zero.
/// - [`BookingError::TooManyTravelers`]: a category lists more travelers than were booked.
pub fn validate_travelers(
    occupancy: &Occupancy,
    travelers: &[Traveler],
) -> Result<(), BookingError> {
    if occupancy.adults == 0 {
        return Err(BookingError::NoAdults);
    }

    for category in [
        TravelerCategory::Adult,
        TravelerCategory::Child,
        TravelerCategory::Infant,
    ] {
        let listed = travelers
            .iter()
            .filter(|traveler| traveler.category == category)
            .count();

        let listed = u32::try_from(listed).unwrap_or(u32::MAX);
        let booked = occupancy.count(category);

        if listed > booked {
            return Err(BookingError::TooManyTravelers {
                category,
                listed,
                booked,
            });
        }
    }

    Ok(())
}
