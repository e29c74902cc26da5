//! Booking Models

use hearth::{
    bookings::{Booking, BookingStatus, PaymentStatus},
    refunds::RefundDecision,
};
use serde::Serialize;

/// The pair of statuses a compare-and-set transition matches and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingState {
    /// Reservation status
    pub booking_status: BookingStatus,

    /// Payment status
    pub payment_status: PaymentStatus,
}

impl BookingState {
    /// Create a state pair.
    pub const fn new(booking_status: BookingStatus, payment_status: PaymentStatus) -> Self {
        Self {
            booking_status,
            payment_status,
        }
    }

    /// Current state of `booking`.
    pub const fn of(booking: &Booking) -> Self {
        Self::new(booking.booking_status, booking.payment_status)
    }
}

/// Result of cancelling a booking.
#[derive(Debug, Clone, Serialize)]
pub struct Cancellation {
    /// Booking after cancellation
    pub booking: Booking,

    /// Refund entitlement computed for the cancellation.
    ///
    /// `new_payment_status` is the status that was persisted: `Refunded` only when the gateway
    /// returned money, otherwise the payment status the booking already had.
    pub decision: RefundDecision,

    /// Gateway refund identifier, when money was returned
    pub refund_id: Option<String>,
}
