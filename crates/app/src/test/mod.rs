//! Shared test fixtures.

mod helpers;

pub(crate) use context::TestContext;
pub(crate) use helpers::pending_booking;
