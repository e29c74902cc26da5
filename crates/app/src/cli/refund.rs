use clap::Args;
use hearth::{
    bookings::{
        Booking, BookingStatus, BookingUuid, Occupancy, PaymentStatus, PriceSnapshot,
        PropertyUuid, UserUuid,
    },
    stays::StayWindow,
};
use hearth_app::config::AppConfig;
use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct RefundArgs {
    /// Total paid for the booking, in major currency units
    #[arg(long)]
    total: Decimal,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long)]
    check_in: Date,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long)]
    check_out: Date,

    /// Cancellation instant (RFC 3339); defaults to now
    #[arg(long)]
    now: Option<Timestamp>,
}

pub(crate) fn run(config: &AppConfig, args: &RefundArgs) -> Result<(), String> {
    let policies = config
        .load_policies()
        .map_err(|error| format!("failed to load policies: {error}"))?;

    let stay = StayWindow::new(args.check_in, args.check_out)
        .map_err(|error| format!("invalid stay: {error}"))?;

    let total_nights = stay
        .nights()
        .map_err(|error| format!("invalid stay: {error}"))?;

    let now = args.now.unwrap_or_else(Timestamp::now);

    let booking = Booking {
        uuid: BookingUuid::new(),
        property: PropertyUuid::new(),
        traveler: UserUuid::new(),
        host: UserUuid::new(),
        stay,
        occupancy: Occupancy {
            adults: 1,
            children: 0,
            infants: 0,
        },
        travelers: Vec::new(),
        price: PriceSnapshot {
            nightly_rate: Decimal::ZERO,
            total_nights,
            total: args.total,
        },
        coupon_code: None,
        order_id: None,
        payment_id: None,
        payment_status: PaymentStatus::Paid,
        booking_status: BookingStatus::Confirmed,
        notes: None,
        created_at: now,
        updated_at: now,
    };

    let decision = policies
        .refunds()
        .compute_refund(&booking, now)
        .map_err(|error| format!("failed to compute refund: {error}"))?;

    super::print_json(&decision)
}
