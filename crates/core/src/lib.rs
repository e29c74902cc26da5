//! Hearth
//!
//! Hearth is the pricing and cancellation core of a vacation-rental marketplace: stay quotes,
//! coupon rules, tiered refund entitlements and payment signature checks, all as pure
//! computations over values supplied by the caller.

pub mod bookings;
pub mod coupons;
pub mod money;
pub mod payments;
pub mod policies;
pub mod prelude;
pub mod pricing;
pub mod refunds;
pub mod stays;
pub mod uuids;
