//! Money
//!
//! Amounts are carried as [`Decimal`] major currency units (e.g. euros) and are never rounded
//! while a computation is in progress. Two conversions leave that representation: rounding for
//! presentation, and integer minor units at the payment-gateway boundary.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Findable, Money, iso::Currency};
use thiserror::Error;

/// Decimal places used when presenting an amount.
pub const PRESENTATION_SCALE: u32 = 2;

/// Errors raised when an amount crosses the gateway boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is negative and cannot be charged or refunded.
    #[error("amount {0} is negative")]
    Negative(Decimal),

    /// The amount does not fit in a 64-bit count of minor units.
    #[error("amount {0} is out of range for minor units")]
    OutOfRange(Decimal),

    /// The currency code is not supported.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Round an amount for presentation (2 decimal places, midpoint away from zero).
#[must_use]
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(PRESENTATION_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a major-unit amount into the integer minor units a payment gateway expects.
///
/// # Errors
///
/// - [`MoneyError::Negative`]: the amount is below zero.
/// - [`MoneyError::OutOfRange`]: the scaled amount does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }

    let scale = Decimal::from(10_u64.pow(currency.exponent));

    amount
        .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(scale)
        .and_then(|minor| minor.to_i64())
        .ok_or(MoneyError::OutOfRange(amount))
}

/// Format an amount with its currency symbol, rounded for presentation.
#[must_use]
pub fn format_amount(amount: Decimal, currency: &Currency) -> String {
    Money::from_decimal(round_for_display(amount), currency).to_string()
}

/// Resolve an ISO 4217 currency code, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns [`MoneyError::UnknownCurrency`] for codes that are not ISO currencies.
pub fn parse_currency(code: &str) -> Result<&'static Currency, MoneyError> {
    let code = code.trim().to_ascii_uppercase();

    let Some(currency) = Currency::find(&code) else {
        return Err(MoneyError::UnknownCurrency(code));
    };

    Ok(currency)
}
