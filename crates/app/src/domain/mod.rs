//! Hearth Domain Concerns

pub mod bookings;
pub mod coupons;
pub mod properties;
