//! Pricing
//!
//! Quotes a stay: nights × nightly rate, less an optional coupon discount, plus a flat platform
//! fee charged once per booking. Every step works on unrounded amounts; rounding happens only
//! when a quote is presented.

use std::io;

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::iso::{Currency, EUR};
use serde::{Serialize, Serializer};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    coupons::Coupon,
    money::{format_amount, round_for_display},
    stays::{StayError, StayWindow},
};

/// Platform fee charged when no policy overrides it.
pub const DEFAULT_PLATFORM_FEE: Decimal = Decimal::from_parts(75, 0, 0, false, 0);

/// Errors that can occur while computing a quote.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The nightly rate is zero or negative.
    #[error("invalid nightly rate {0}; rates must be positive")]
    InvalidRate(Decimal),

    /// The stay spans no nights or starts in the past.
    #[error(transparent)]
    InvalidDateRange(#[from] StayError),

    /// The platform fee is negative.
    #[error("invalid platform fee {0}; fees cannot be negative")]
    InvalidPlatformFee(Decimal),

    /// An intermediate amount exceeded the representable range.
    #[error("quote amount overflowed")]
    Overflow,

    /// Writing the quote breakdown failed.
    #[error("failed to write quote")]
    Io(#[from] io::Error),
}

/// Price breakdown for a prospective stay, in unrounded major currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    /// Nightly rate the quote was computed from
    pub nightly_rate: Decimal,

    /// Nights in the stay
    pub total_nights: u32,

    /// Nights × nightly rate
    pub subtotal: Decimal,

    /// Coupon discount, never more than the subtotal
    pub discount: Decimal,

    /// Subtotal less discount
    pub discounted_subtotal: Decimal,

    /// Flat per-booking fee
    pub platform_fee: Decimal,

    /// Discounted subtotal plus platform fee
    pub total: Decimal,

    /// Whether a coupon discount was applied
    pub coupon_applied: bool,

    /// Currency every amount is expressed in
    #[serde(serialize_with = "serialize_currency")]
    pub currency: &'static Currency,
}

fn serialize_currency<S: Serializer>(
    currency: &&'static Currency,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(currency.iso_alpha_code)
}

impl Quote {
    /// A copy with every monetary field rounded for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_for_display(self.subtotal),
            discount: round_for_display(self.discount),
            discounted_subtotal: round_for_display(self.discounted_subtotal),
            platform_fee: round_for_display(self.platform_fee),
            total: round_for_display(self.total),
            ..*self
        }
    }

    /// Write a price breakdown table.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Io`] if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), PricingError> {
        let currency = self.currency;
        let mut builder = Builder::default();

        builder.push_record(["", "Amount"]);

        builder.push_record([
            format!(
                "{} × {} night{}",
                format_amount(self.nightly_rate, currency),
                self.total_nights,
                if self.total_nights == 1 { "" } else { "s" }
            ),
            format_amount(self.subtotal, currency),
        ]);

        if self.coupon_applied {
            builder.push_record([
                "Coupon discount".to_string(),
                format!("-{}", format_amount(self.discount, currency)),
            ]);
        }

        builder.push_record([
            "Platform fee".to_string(),
            format_amount(self.platform_fee, currency),
        ]);

        builder.push_record(["Total".to_string(), format_amount(self.total, currency)]);

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..), Alignment::right());

        writeln!(out, "{table}")?;

        Ok(())
    }
}

/// Pricing rules for a marketplace deployment.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    platform_fee: Decimal,
    currency: &'static Currency,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            platform_fee: DEFAULT_PLATFORM_FEE,
            currency: EUR,
        }
    }
}

impl PricingPolicy {
    /// Create a policy charging `platform_fee` per booking in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidPlatformFee`] if the fee is negative.
    pub fn new(platform_fee: Decimal, currency: &'static Currency) -> Result<Self, PricingError> {
        if platform_fee.is_sign_negative() && !platform_fee.is_zero() {
            return Err(PricingError::InvalidPlatformFee(platform_fee));
        }

        Ok(Self {
            platform_fee,
            currency,
        })
    }

    /// Return the flat platform fee.
    pub const fn platform_fee(&self) -> Decimal {
        self.platform_fee
    }

    /// Return the currency all amounts are expressed in.
    pub const fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Quote a stay given as raw dates.
    ///
    /// # Errors
    ///
    /// See [`PricingPolicy::compute_quote`]; additionally fails with
    /// [`PricingError::InvalidDateRange`] when `check_out` is not after `check_in`.
    pub fn quote_dates(
        &self,
        nightly_rate: Decimal,
        check_in: Date,
        check_out: Date,
        today: Date,
        coupon: Option<&Coupon>,
    ) -> Result<Quote, PricingError> {
        let stay = StayWindow::new(check_in, check_out)?;

        self.compute_quote(nightly_rate, &stay, today, coupon)
    }

    /// Quote a stay.
    ///
    /// The coupon, when given, must already have passed
    /// [`is_coupon_applicable`](crate::coupons::is_coupon_applicable); only its minimum order
    /// value is re-checked here, against the subtotal computed for this stay. A coupon that does
    /// not qualify yields no discount and `coupon_applied == false`.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidRate`]: `nightly_rate` is zero or negative.
    /// - [`PricingError::InvalidDateRange`]: the stay starts before `today`.
    /// - [`PricingError::Overflow`]: the amounts cannot be represented.
    pub fn compute_quote(
        &self,
        nightly_rate: Decimal,
        stay: &StayWindow,
        today: Date,
        coupon: Option<&Coupon>,
    ) -> Result<Quote, PricingError> {
        if nightly_rate <= Decimal::ZERO {
            return Err(PricingError::InvalidRate(nightly_rate));
        }

        stay.ensure_not_past(today)?;

        let total_nights = stay.nights()?;

        let subtotal = nightly_rate
            .checked_mul(Decimal::from(total_nights))
            .ok_or(PricingError::Overflow)?;

        let discount = coupon.and_then(|coupon| coupon.discount_on(subtotal));
        let coupon_applied = discount.is_some();
        let discount = discount.unwrap_or(Decimal::ZERO);

        let discounted_subtotal = subtotal - discount;

        let total = discounted_subtotal
            .checked_add(self.platform_fee)
            .ok_or(PricingError::Overflow)?;

        Ok(Quote {
            nightly_rate,
            total_nights,
            subtotal,
            discount,
            discounted_subtotal,
            platform_fee: self.platform_fee,
            total,
            coupon_applied,
            currency: self.currency,
        })
    }
}
