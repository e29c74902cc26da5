//! Properties

pub mod errors;
pub mod models;
pub mod repository;

pub use errors::PropertiesError;
pub use repository::*;
