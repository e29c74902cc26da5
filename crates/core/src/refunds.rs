//! Refunds
//!
//! Cancellation is unconditional; only the refund is tiered. A refund schedule maps lead time
//! before check-in to a percentage of the booking price. Tiers are sorted by threshold, longest
//! first, and the first tier the lead time meets wins.

use jiff::{
    Timestamp,
    civil::{Time, time},
    tz::TimeZone,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bookings::{Booking, BookingStatus, PaymentStatus},
    money::round_for_display,
    stays::StayError,
};

const SECONDS_PER_HOUR: i64 = 3_600;

/// Errors raised while building a schedule or computing a refund.
#[derive(Debug, Error)]
pub enum RefundError {
    /// A tier's percentage lies outside `0..=100`.
    #[error("refund tier at {min_hours}h has invalid percentage {percentage}")]
    InvalidTier {
        /// Tier threshold
        min_hours: u32,
        /// Offending percentage
        percentage: Decimal,
    },

    /// Two tiers share the same threshold.
    #[error("refund schedule has more than one tier at {0}h")]
    DuplicateTier(u32),

    /// The booking is already cancelled or refunded.
    #[error("booking cannot be cancelled: status {booking_status:?}, payment {payment_status:?}")]
    NotCancellable {
        /// Current booking status
        booking_status: BookingStatus,
        /// Current payment status
        payment_status: PaymentStatus,
    },

    /// The check-in instant could not be determined.
    #[error(transparent)]
    CheckIn(#[from] StayError),

    /// The refund amount cannot be represented.
    #[error("refund amount overflow")]
    Overflow,
}

/// Lead-time threshold mapped to a refund percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundTier {
    /// Minimum hours before check-in for this tier to apply
    pub min_hours: u32,

    /// Share of the booking price refunded, in percent
    pub percentage: Decimal,
}

impl RefundTier {
    /// Create a tier.
    pub const fn new(min_hours: u32, percentage: Decimal) -> Self {
        Self {
            min_hours,
            percentage,
        }
    }
}

/// Validated refund tiers, longest lead time first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundSchedule {
    tiers: Vec<RefundTier>,
}

impl Default for RefundSchedule {
    /// One week or more: full refund; three days: half; one day: a quarter; otherwise nothing.
    fn default() -> Self {
        Self {
            tiers: vec![
                RefundTier::new(168, Decimal::ONE_HUNDRED),
                RefundTier::new(72, Decimal::from(50)),
                RefundTier::new(24, Decimal::from(25)),
            ],
        }
    }
}

impl RefundSchedule {
    /// Build a schedule from tiers in any order.
    ///
    /// # Errors
    ///
    /// - [`RefundError::InvalidTier`]: a percentage is outside `0..=100`.
    /// - [`RefundError::DuplicateTier`]: two tiers share a threshold.
    pub fn new(mut tiers: Vec<RefundTier>) -> Result<Self, RefundError> {
        if let Some(tier) = tiers
            .iter()
            .find(|tier| tier.percentage < Decimal::ZERO || tier.percentage > Decimal::ONE_HUNDRED)
        {
            return Err(RefundError::InvalidTier {
                min_hours: tier.min_hours,
                percentage: tier.percentage,
            });
        }

        tiers.sort_by(|a, b| b.min_hours.cmp(&a.min_hours));

        if let Some((tier, _next)) = tiers
            .iter()
            .zip(tiers.iter().skip(1))
            .find(|(tier, next)| tier.min_hours == next.min_hours)
        {
            return Err(RefundError::DuplicateTier(tier.min_hours));
        }

        Ok(Self { tiers })
    }

    /// Tiers, longest lead time first.
    pub fn tiers(&self) -> &[RefundTier] {
        &self.tiers
    }

    /// Refund percentage for a cancellation made `lead_seconds` before check-in.
    ///
    /// Negative lead times (check-in has passed) and lead times below every tier yield zero.
    pub fn percentage_for(&self, lead_seconds: i64) -> Decimal {
        if lead_seconds < 0 {
            return Decimal::ZERO;
        }

        self.tiers
            .iter()
            .find(|tier| lead_seconds >= i64::from(tier.min_hours) * SECONDS_PER_HOUR)
            .map_or(Decimal::ZERO, |tier| tier.percentage)
    }
}

/// Outcome of a cancellation: the refund owed and the statuses the booking moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefundDecision {
    /// Amount owed back to the traveler, rounded for presentation
    pub refund_amount: Decimal,

    /// Percentage of the booking price refunded
    pub refund_percentage: Decimal,

    /// Always [`BookingStatus::Cancelled`]
    pub new_booking_status: BookingStatus,

    /// [`PaymentStatus::Refunded`] when money is owed, otherwise unchanged
    pub new_payment_status: PaymentStatus,
}

impl RefundDecision {
    /// Whether any money is owed back.
    pub fn owes_refund(&self) -> bool {
        self.refund_amount > Decimal::ZERO
    }
}

/// Refund rules: the tier schedule and the local check-in time it measures lead time against.
#[derive(Debug, Clone)]
pub struct RefundPolicy {
    schedule: RefundSchedule,
    check_in_time: Time,
    time_zone: TimeZone,
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self {
            schedule: RefundSchedule::default(),
            check_in_time: time(0, 0, 0, 0),
            time_zone: TimeZone::UTC,
        }
    }
}

impl RefundPolicy {
    /// Create a policy.
    pub fn new(schedule: RefundSchedule, check_in_time: Time, time_zone: TimeZone) -> Self {
        Self {
            schedule,
            check_in_time,
            time_zone,
        }
    }

    /// Return the refund schedule.
    pub const fn schedule(&self) -> &RefundSchedule {
        &self.schedule
    }

    /// Return the local check-in time.
    pub const fn check_in_time(&self) -> Time {
        self.check_in_time
    }

    /// Return the time zone check-in times are local to.
    pub const fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// Compute the refund owed if `booking` is cancelled at `now`.
    ///
    /// This is pure: it only computes the entitlement and can be recomputed freely if executing
    /// the refund fails.
    ///
    /// # Errors
    ///
    /// - [`RefundError::NotCancellable`]: the booking is already cancelled or refunded.
    /// - [`RefundError::CheckIn`]: the check-in instant does not resolve.
    /// - [`RefundError::Overflow`]: the refund amount cannot be represented.
    pub fn compute_refund(
        &self,
        booking: &Booking,
        now: Timestamp,
    ) -> Result<RefundDecision, RefundError> {
        if booking.is_terminal() {
            return Err(RefundError::NotCancellable {
                booking_status: booking.booking_status,
                payment_status: booking.payment_status,
            });
        }

        let check_in = booking
            .stay
            .check_in_at(self.check_in_time, &self.time_zone)?;

        let lead_seconds = check_in.as_second() - now.as_second();
        let refund_percentage = self.schedule.percentage_for(lead_seconds);

        let refund_amount = booking
            .price
            .total
            .checked_mul(refund_percentage)
            .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
            .map(round_for_display)
            .ok_or(RefundError::Overflow)?;

        let new_payment_status = if refund_amount > Decimal::ZERO {
            PaymentStatus::Refunded
        } else {
            booking.payment_status
        };

        Ok(RefundDecision {
            refund_amount,
            refund_percentage,
            new_booking_status: BookingStatus::Cancelled,
            new_payment_status,
        })
    }
}
