//! Hearth application layer
//!
//! Drives the pricing, refund and payment-verification core against its collaborators: the
//! booking, property and coupon stores and the payment gateway.

pub mod config;
pub mod context;
pub mod domain;
pub mod gateway;
pub mod observability;
pub mod requests;

#[cfg(test)]
mod test;
