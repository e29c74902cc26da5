//! Test Helpers

use hearth::{
    bookings::{
        Booking, BookingStatus, BookingUuid, Occupancy, PaymentStatus, PriceSnapshot,
        PropertyUuid, UserUuid,
    },
    stays::StayWindow,
};
use jiff::{Timestamp, civil::Date};
use rust_decimal::{Decimal, dec};
use testresult::TestResult;

/// A stored-shape booking awaiting payment against order `order_test`, priced at 100.00 a night.
pub(crate) fn pending_booking(
    property: PropertyUuid,
    check_in: Date,
    check_out: Date,
) -> TestResult<Booking> {
    let stay = StayWindow::new(check_in, check_out)?;
    let total_nights = stay.nights()?;
    let now = Timestamp::now();

    Ok(Booking {
        uuid: BookingUuid::new(),
        property,
        traveler: UserUuid::new(),
        host: UserUuid::new(),
        stay,
        occupancy: Occupancy {
            adults: 2,
            children: 0,
            infants: 0,
        },
        travelers: Vec::new(),
        price: PriceSnapshot {
            nightly_rate: dec!(100),
            total_nights,
            total: dec!(100) * Decimal::from(total_nights) + dec!(75),
        },
        coupon_code: None,
        order_id: Some("order_test".to_string()),
        payment_id: None,
        payment_status: PaymentStatus::Pending,
        booking_status: BookingStatus::Pending,
        notes: None,
        created_at: now,
        updated_at: now,
    })
}
