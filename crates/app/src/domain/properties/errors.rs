//! Properties errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the properties store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertiesError {
    /// No property has the requested identifier.
    #[error("property not found")]
    NotFound,

    /// A property with this identifier already exists.
    #[error("property already exists")]
    AlreadyExists,

    /// Nightly rates must be positive.
    #[error("invalid nightly rate {0}")]
    InvalidRate(Decimal),
}
