//! Hearth prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bookings::{
        Booking, BookingError, BookingStatus, BookingUuid, Occupancy, PaymentStatus,
        PriceSnapshot, PropertyUuid, Traveler, TravelerCategory, UserUuid, validate_travelers,
    },
    coupons::{Coupon, DiscountType, is_coupon_applicable},
    money::{MoneyError, format_amount, parse_currency, round_for_display, to_minor_units},
    payments::{PaymentConfigError, PaymentSecret, sign_payment, verify_payment_signature},
    policies::{Policies, PolicyError},
    pricing::{PricingError, PricingPolicy, Quote},
    refunds::{RefundDecision, RefundError, RefundPolicy, RefundSchedule, RefundTier},
    stays::{StayError, StayWindow},
    uuids::TypedUuid,
};
