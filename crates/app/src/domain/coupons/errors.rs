//! Coupons errors.

use thiserror::Error;

/// Errors raised by the coupons store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponsError {
    /// No coupon has the requested code.
    #[error("coupon not found")]
    NotFound,

    /// A coupon with this code already exists.
    #[error("coupon already exists")]
    AlreadyExists,

    /// Every allowed redemption has been used.
    #[error("coupon usage limit reached")]
    Exhausted,

    /// The coupon expired before it was redeemed.
    #[error("coupon has expired")]
    Expired,
}
