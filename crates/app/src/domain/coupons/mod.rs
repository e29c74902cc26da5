//! Coupons

pub mod errors;
pub mod repository;

pub use errors::CouponsError;
pub use repository::*;
