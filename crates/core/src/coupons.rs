//! Coupons
//!
//! A coupon is a discount code with a usage allowance, an expiry and a minimum order value.
//! Checking applicability is a pure predicate; redeeming a coupon (incrementing its used count)
//! belongs to the persistence layer and happens only after a booking has been created with it.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a coupon's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a percentage (0-100) of the subtotal.
    Percentage,

    /// `discount_value` is an amount in major currency units.
    Fixed,

    /// A discount type this engine does not know; such coupons never discount anything.
    #[serde(other)]
    Unrecognized,
}

/// A discount code as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique code entered by the traveler
    pub code: String,

    /// How `discount_value` is interpreted
    pub discount_type: DiscountType,

    /// Percentage points or an amount, depending on `discount_type`
    pub discount_value: Decimal,

    /// Last instant at which the coupon may be used
    pub expires_at: Timestamp,

    /// Total number of redemptions allowed
    pub usage_limit: u32,

    /// Redemptions so far
    pub used_count: u32,

    /// Smallest subtotal the coupon may be applied to
    #[serde(default)]
    pub min_order_value: Decimal,
}

impl Coupon {
    /// Whether the coupon still has redemptions left.
    pub const fn has_redemptions_left(&self) -> bool {
        self.used_count < self.usage_limit
    }

    /// Whether the coupon may be applied at `now` to an order of `subtotal`.
    pub fn is_applicable(&self, now: Timestamp, subtotal: Decimal) -> bool {
        is_coupon_applicable(self, now, subtotal)
    }

    /// The discount this coupon grants on `subtotal`.
    ///
    /// Returns `None` when the subtotal is below the minimum order value or the discount type is
    /// unrecognized. The discount is clamped so it never exceeds the subtotal and is never
    /// negative.
    pub fn discount_on(&self, subtotal: Decimal) -> Option<Decimal> {
        if subtotal < self.min_order_value {
            return None;
        }

        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let fraction = self
                    .discount_value
                    .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
                    / Decimal::ONE_HUNDRED;

                subtotal * fraction
            }
            DiscountType::Fixed => self.discount_value,
            DiscountType::Unrecognized => return None,
        };

        Some(discount.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO)))
    }
}

/// Whether `coupon` may be used at `now` for an order of `subtotal`.
///
/// All of the following must hold: redemptions remain, the coupon has not expired, and the
/// subtotal meets the minimum order value.
pub fn is_coupon_applicable(coupon: &Coupon, now: Timestamp, subtotal: Decimal) -> bool {
    coupon.has_redemptions_left() && now <= coupon.expires_at && subtotal >= coupon.min_order_value
}
