//! Bookings errors.

use hearth::{
    bookings::BookingError, money::MoneyError, payments::PaymentConfigError,
    pricing::PricingError, refunds::RefundError,
};
use thiserror::Error;

use crate::{
    domain::{
        bookings::models::BookingState, coupons::CouponsError, properties::PropertiesError,
    },
    gateway::GatewayError,
    requests::ValidationError,
};

/// Errors raised by the bookings store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingsRepositoryError {
    /// No booking has the requested identifier.
    #[error("booking not found")]
    NotFound,

    /// A booking with this identifier already exists.
    #[error("booking already exists")]
    AlreadyExists,

    /// The property is already booked for some of the requested nights.
    #[error("property is not available for the requested dates")]
    Unavailable,

    /// The booking is no longer in the state the update expected.
    #[error("booking is {actual:?}, expected {expected:?}")]
    Conflict {
        /// State the update required
        expected: BookingState,
        /// State found in the store
        actual: BookingState,
    },

    /// The payment does not belong to the booking's order.
    #[error("order does not belong to this booking")]
    OrderMismatch,

    /// A cancellation of this booking is in flight.
    #[error("booking is being cancelled")]
    Cancelling,

    /// No cancellation of this booking is in flight.
    #[error("booking has no cancellation in flight")]
    NotCancelling,
}

/// Errors returned by the bookings service.
#[derive(Debug, Error)]
pub enum BookingsServiceError {
    /// The request failed boundary validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The stay could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The refund entitlement could not be computed.
    #[error(transparent)]
    Refund(#[from] RefundError),

    /// The booking would violate its invariants.
    #[error("invalid booking")]
    Booking(#[from] BookingError),

    /// An amount could not be sent to the gateway.
    #[error("invalid amount")]
    Amount(#[from] MoneyError),

    /// Payment verification is not configured.
    #[error("payment configuration error")]
    Config(#[from] PaymentConfigError),

    /// The payment gateway failed; nothing was persisted.
    #[error("payment gateway error")]
    Gateway(#[from] GatewayError),

    /// The booking, property or coupon does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The property is already booked for the requested dates.
    #[error("property is not available for the requested dates")]
    Unavailable,

    /// More guests than the property sleeps.
    #[error("{requested} guests requested but the property sleeps {max_guests}")]
    OverCapacity {
        /// Guests on the request
        requested: u32,
        /// Property capacity
        max_guests: u32,
    },

    /// The booking changed underneath the request.
    #[error("booking was modified concurrently")]
    Conflict,

    /// The payment signature did not verify, or belongs to another order.
    #[error("payment signature is invalid")]
    InvalidSignature,

    /// The coupon store failed.
    #[error("coupon error")]
    Coupons(#[source] CouponsError),

    /// The properties store failed.
    #[error("property error")]
    Properties(#[source] PropertiesError),

    /// The bookings store failed.
    #[error("booking store error")]
    Store(#[source] BookingsRepositoryError),
}

impl From<BookingsRepositoryError> for BookingsServiceError {
    fn from(error: BookingsRepositoryError) -> Self {
        match error {
            BookingsRepositoryError::NotFound => Self::NotFound("booking"),
            BookingsRepositoryError::Unavailable => Self::Unavailable,
            BookingsRepositoryError::Conflict { .. } | BookingsRepositoryError::Cancelling => {
                Self::Conflict
            }
            BookingsRepositoryError::OrderMismatch => Self::InvalidSignature,
            BookingsRepositoryError::AlreadyExists | BookingsRepositoryError::NotCancelling => {
                Self::Store(error)
            }
        }
    }
}

impl From<PropertiesError> for BookingsServiceError {
    fn from(error: PropertiesError) -> Self {
        match error {
            PropertiesError::NotFound => Self::NotFound("property"),
            PropertiesError::AlreadyExists | PropertiesError::InvalidRate(_) => {
                Self::Properties(error)
            }
        }
    }
}

impl From<CouponsError> for BookingsServiceError {
    fn from(error: CouponsError) -> Self {
        match error {
            CouponsError::NotFound => Self::NotFound("coupon"),
            CouponsError::AlreadyExists | CouponsError::Exhausted | CouponsError::Expired => {
                Self::Coupons(error)
            }
        }
    }
}
