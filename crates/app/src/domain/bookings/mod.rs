//! Bookings

pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::{BookingsRepositoryError, BookingsServiceError};
pub use repository::*;
pub use service::*;
