//! Requests
//!
//! Request bodies are parsed against an explicit schema and validated before any value reaches
//! the pricing or refund core. Unknown fields are rejected rather than ignored.

use hearth::{
    bookings::{BookingError, Occupancy, PropertyUuid, Traveler, UserUuid, validate_travelers},
    stays::{StayError, StayWindow},
};
use jiff::civil::Date;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

/// Longest accepted booking note, in characters.
pub const MAX_NOTES_CHARS: usize = 1_000;

/// Longest accepted coupon code, in characters.
pub const MAX_COUPON_CODE_CHARS: usize = 32;

/// Request validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The body does not match the request schema.
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The stay dates are invalid.
    #[error(transparent)]
    Stay(#[from] StayError),

    /// Guest counts or traveler details are inconsistent.
    #[error(transparent)]
    Travelers(#[from] BookingError),

    /// A traveler was submitted without a name.
    #[error("traveler {0} has no name")]
    BlankTravelerName(usize),

    /// The notes exceed [`MAX_NOTES_CHARS`].
    #[error("notes are {0} characters long; at most {max} are allowed", max = MAX_NOTES_CHARS)]
    NotesTooLong(usize),

    /// The coupon code is empty, too long or contains unexpected characters.
    #[error("invalid coupon code: {0:?}")]
    InvalidCouponCode(String),
}

/// Parse a JSON request body.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] if the body does not match the schema of `T`.
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ValidationError> {
    Ok(serde_json::from_str(body)?)
}

/// Request for a price quote.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteRequest {
    /// Property to stay at
    pub property: PropertyUuid,

    /// Check-in date
    pub check_in: Date,

    /// Check-out date
    pub check_out: Date,

    /// Coupon code entered by the traveler
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// A quote request whose values have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuoteRequest {
    /// Property to stay at
    pub property: PropertyUuid,

    /// Stay window, not in the past
    pub stay: StayWindow,

    /// Normalised coupon code
    pub coupon_code: Option<String>,
}

impl QuoteRequest {
    /// Validate the request as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found.
    pub fn validate(self, today: Date) -> Result<ValidQuoteRequest, ValidationError> {
        Ok(ValidQuoteRequest {
            property: self.property,
            stay: validate_stay(self.check_in, self.check_out, today)?,
            coupon_code: normalize_coupon_code(self.coupon_code)?,
        })
    }
}

/// Request to book a stay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingRequest {
    /// Property to stay at
    pub property: PropertyUuid,

    /// Traveler making the booking
    pub traveler: UserUuid,

    /// Check-in date
    pub check_in: Date,

    /// Check-out date
    pub check_out: Date,

    /// Adult guests
    pub adults: u32,

    /// Child guests
    #[serde(default)]
    pub children: u32,

    /// Infant guests
    #[serde(default)]
    pub infants: u32,

    /// Traveler details
    #[serde(default)]
    pub travelers: Vec<Traveler>,

    /// Free-text notes for the host
    #[serde(default)]
    pub notes: Option<String>,

    /// Coupon code entered by the traveler
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// A booking request whose values have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBookingRequest {
    /// Property to stay at
    pub property: PropertyUuid,

    /// Traveler making the booking
    pub traveler: UserUuid,

    /// Stay window, not in the past
    pub stay: StayWindow,

    /// Guest counts, at least one adult
    pub occupancy: Occupancy,

    /// Traveler details, within the guest counts
    pub travelers: Vec<Traveler>,

    /// Trimmed notes, `None` when blank
    pub notes: Option<String>,

    /// Normalised coupon code
    pub coupon_code: Option<String>,
}

impl ValidBookingRequest {
    /// The quote request implied by this booking.
    pub fn quote(&self) -> ValidQuoteRequest {
        ValidQuoteRequest {
            property: self.property,
            stay: self.stay,
            coupon_code: self.coupon_code.clone(),
        }
    }
}

impl BookingRequest {
    /// Validate the request as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found.
    pub fn validate(self, today: Date) -> Result<ValidBookingRequest, ValidationError> {
        let stay = validate_stay(self.check_in, self.check_out, today)?;

        let occupancy = Occupancy {
            adults: self.adults,
            children: self.children,
            infants: self.infants,
        };

        validate_travelers(&occupancy, &self.travelers)?;

        if let Some(index) = self
            .travelers
            .iter()
            .position(|traveler| traveler.name.trim().is_empty())
        {
            return Err(ValidationError::BlankTravelerName(index));
        }

        let notes = self
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());

        if let Some(notes) = &notes {
            let chars = notes.chars().count();

            if chars > MAX_NOTES_CHARS {
                return Err(ValidationError::NotesTooLong(chars));
            }
        }

        Ok(ValidBookingRequest {
            property: self.property,
            traveler: self.traveler,
            stay,
            occupancy,
            travelers: self.travelers,
            notes,
            coupon_code: normalize_coupon_code(self.coupon_code)?,
        })
    }
}

/// Payment details the gateway hands back to the traveler's client after checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentConfirmation {
    /// Gateway order the payment was made against
    pub order_id: String,

    /// Captured gateway payment
    pub payment_id: String,

    /// Hex HMAC-SHA256 signature over the order and payment ids
    pub signature: String,
}

fn validate_stay(check_in: Date, check_out: Date, today: Date) -> Result<StayWindow, StayError> {
    let stay = StayWindow::new(check_in, check_out)?;

    stay.ensure_not_past(today)?;

    Ok(stay)
}

fn normalize_coupon_code(code: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(code) = code else {
        return Ok(None);
    };

    let trimmed = code.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    let valid = trimmed.chars().count() <= MAX_COUPON_CODE_CHARS
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !valid {
        return Err(ValidationError::InvalidCouponCode(code));
    }

    Ok(Some(trimmed.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use hearth::bookings::TravelerCategory;
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    const TODAY: Date = date(2026, 6, 1);

    fn booking_body(extra: &str) -> String {
        format!(
            r#"{{
                "property": "01890a5d-ac96-774b-bcce-b302099a8057",
                "traveler": "01890a5d-ac96-774b-bcce-b302099a8058",
                "check_in": "2026-07-01",
                "check_out": "2026-07-04",
                "adults": 2,
                "children": 1,
                "travelers": [
                    {{ "name": "Ada", "age": 34, "gender": "female", "nationality": "GB", "category": "adult" }},
                    {{ "name": "Tom", "age": 8, "gender": "male", "nationality": "GB", "category": "child" }}
                ]{extra}
            }}"#
        )
    }

    #[test]
    fn valid_booking_request_passes() -> TestResult {
        let request: BookingRequest =
            parse_json(&booking_body(r#", "notes": "  late arrival  ", "coupon_code": " summer-10 ""#))?;

        let valid = request.validate(TODAY)?;

        assert_eq!(valid.stay.nights()?, 3);
        assert_eq!(valid.occupancy.total(), 3);
        assert_eq!(valid.notes.as_deref(), Some("late arrival"));
        assert_eq!(valid.coupon_code.as_deref(), Some("SUMMER-10"));

        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<BookingRequest, _> = parse_json(&booking_body(r#", "discount": 50"#));

        assert!(
            matches!(result, Err(ValidationError::Malformed(_))),
            "expected Malformed, got {result:?}"
        );
    }

    #[test]
    fn wrongly_typed_fields_are_rejected() {
        let result: Result<QuoteRequest, _> = parse_json(
            r#"{ "property": "01890a5d-ac96-774b-bcce-b302099a8057", "check_in": 20260701, "check_out": "2026-07-04" }"#,
        );

        assert!(
            matches!(result, Err(ValidationError::Malformed(_))),
            "expected Malformed, got {result:?}"
        );
    }

    #[test]
    fn empty_range_is_rejected() -> TestResult {
        let request: QuoteRequest = parse_json(
            r#"{ "property": "01890a5d-ac96-774b-bcce-b302099a8057", "check_in": "2026-07-04", "check_out": "2026-07-04" }"#,
        )?;

        let result = request.validate(TODAY);

        assert!(
            matches!(result, Err(ValidationError::Stay(StayError::EmptyRange { .. }))),
            "expected EmptyRange, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn past_check_in_is_rejected() -> TestResult {
        let request: QuoteRequest = parse_json(
            r#"{ "property": "01890a5d-ac96-774b-bcce-b302099a8057", "check_in": "2026-05-30", "check_out": "2026-06-02" }"#,
        )?;

        let result = request.validate(TODAY);

        assert!(
            matches!(result, Err(ValidationError::Stay(StayError::InPast { .. }))),
            "expected InPast, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn zero_adults_is_rejected() -> TestResult {
        let mut request: BookingRequest = parse_json(&booking_body(""))?;
        request.adults = 0;
        request.travelers.clear();

        let result = request.validate(TODAY);

        assert!(
            matches!(result, Err(ValidationError::Travelers(BookingError::NoAdults))),
            "expected NoAdults, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn more_travelers_than_booked_is_rejected() -> TestResult {
        let mut request: BookingRequest = parse_json(&booking_body(""))?;
        request.travelers.push(Traveler {
            name: "Mia".to_string(),
            age: 1,
            gender: "female".to_string(),
            nationality: "GB".to_string(),
            category: TravelerCategory::Infant,
        });

        let result = request.validate(TODAY);

        assert!(
            matches!(
                result,
                Err(ValidationError::Travelers(BookingError::TooManyTravelers { .. }))
            ),
            "expected TooManyTravelers, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn blank_traveler_name_is_rejected() -> TestResult {
        let mut request: BookingRequest = parse_json(&booking_body(""))?;

        if let Some(traveler) = request.travelers.get_mut(1) {
            traveler.name = "   ".to_string();
        }

        let result = request.validate(TODAY);

        assert!(
            matches!(result, Err(ValidationError::BlankTravelerName(1))),
            "expected BlankTravelerName(1), got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn overlong_notes_are_rejected() -> TestResult {
        let mut request: BookingRequest = parse_json(&booking_body(""))?;
        request.notes = Some("x".repeat(MAX_NOTES_CHARS + 1));

        let result = request.validate(TODAY);

        assert!(
            matches!(result, Err(ValidationError::NotesTooLong(_))),
            "expected NotesTooLong, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn odd_coupon_codes_are_rejected() -> TestResult {
        let too_long = "A".repeat(MAX_COUPON_CODE_CHARS + 1);

        for code in ["DROP TABLE", "%%", too_long.as_str()] {
            let mut request: BookingRequest = parse_json(&booking_body(""))?;
            request.coupon_code = Some(code.to_string());

            assert!(
                matches!(
                    request.validate(TODAY),
                    Err(ValidationError::InvalidCouponCode(_))
                ),
                "{code:?} must be rejected"
            );
        }

        Ok(())
    }

    #[test]
    fn blank_coupon_code_means_no_coupon() -> TestResult {
        let mut request: BookingRequest = parse_json(&booking_body(""))?;
        request.coupon_code = Some("   ".to_string());

        assert_eq!(request.validate(TODAY)?.coupon_code, None);

        Ok(())
    }
}
