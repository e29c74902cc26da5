//! Stays
//!
//! A stay is the window between check-in and check-out. Check-out is exclusive of the final
//! night, so the number of nights is the calendar-day difference between the two dates.

use jiff::{
    Timestamp,
    civil::{Date, Time},
    tz::TimeZone,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a stay window.
#[derive(Debug, Error)]
pub enum StayError {
    /// Check-out is on or before check-in.
    #[error("invalid date range: check-out {check_out} must be after check-in {check_in}")]
    EmptyRange {
        /// Requested check-in date
        check_in: Date,
        /// Requested check-out date
        check_out: Date,
    },

    /// Check-in is earlier than the day the booking is made.
    #[error("invalid date range: check-in {check_in} is before {today}")]
    InPast {
        /// Requested check-in date
        check_in: Date,
        /// Day the request was made
        today: Date,
    },

    /// The window is too long to be represented.
    #[error("invalid date range: stay is too long")]
    TooLong,

    /// The check-in instant could not be resolved in the configured time zone.
    #[error("check-in instant could not be resolved: {0}")]
    CheckInInstant(#[from] jiff::Error),
}

/// A validated check-in / check-out pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStayWindow")]
pub struct StayWindow {
    check_in: Date,
    check_out: Date,
}

#[derive(Deserialize)]
struct RawStayWindow {
    check_in: Date,
    check_out: Date,
}

impl TryFrom<RawStayWindow> for StayWindow {
    type Error = StayError;

    fn try_from(raw: RawStayWindow) -> Result<Self, Self::Error> {
        Self::new(raw.check_in, raw.check_out)
    }
}

impl StayWindow {
    /// Create a stay window spanning at least one night.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::EmptyRange`] if `check_out` is not after `check_in`.
    pub fn new(check_in: Date, check_out: Date) -> Result<Self, StayError> {
        if check_out <= check_in {
            return Err(StayError::EmptyRange {
                check_in,
                check_out,
            });
        }

        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Return the check-in date.
    pub const fn check_in(&self) -> Date {
        self.check_in
    }

    /// Return the check-out date.
    pub const fn check_out(&self) -> Date {
        self.check_out
    }

    /// Whether two stays share at least one night.
    ///
    /// Check-out day is free for the next check-in, so back-to-back stays do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Reject windows that start before `today`.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::InPast`] if check-in is earlier than `today`.
    pub fn ensure_not_past(&self, today: Date) -> Result<(), StayError> {
        if self.check_in < today {
            return Err(StayError::InPast {
                check_in: self.check_in,
                today,
            });
        }

        Ok(())
    }

    /// Number of nights in the stay, always at least one.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::TooLong`] if the day count cannot be computed.
    pub fn nights(&self) -> Result<u32, StayError> {
        let days = self
            .check_in
            .until(self.check_out)
            .map_err(|_err| StayError::TooLong)?
            .get_days();

        u32::try_from(days).map_err(|_err| StayError::TooLong)
    }

    /// The instant check-in happens, given the local check-in time and the property's time zone.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::CheckInInstant`] if the local time does not resolve in `tz`.
    pub fn check_in_at(&self, time: Time, tz: &TimeZone) -> Result<Timestamp, StayError> {
        Ok(self.check_in.to_datetime(time).to_zoned(tz.clone())?.timestamp())
    }
}
