//! End-to-end pricing and cancellation scenarios

use hearth::prelude::*;
use jiff::{
    Timestamp, ToSpan,
    civil::{Time, date},
    tz::TimeZone,
};
use rust_decimal::{Decimal, dec};
use testresult::TestResult;

fn coupon(discount_type: DiscountType, value: Decimal, min: Decimal) -> TestResult<Coupon> {
    Ok(Coupon {
        code: "WELCOME".to_string(),
        discount_type,
        discount_value: value,
        expires_at: "2026-12-31T23:59:59Z".parse()?,
        usage_limit: 3,
        used_count: 0,
        min_order_value: min,
    })
}

fn paid_booking(total: Decimal, stay: StayWindow) -> TestResult<Booking> {
    let created: Timestamp = "2026-06-01T09:00:00Z".parse()?;
    let total_nights = stay.nights()?;

    Ok(Booking {
        uuid: BookingUuid::new(),
        property: PropertyUuid::new(),
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
            nightly_rate: total / Decimal::from(total_nights),
            total_nights,
            total,
        },
        coupon_code: None,
        order_id: Some("order_1".to_string()),
        payment_id: Some("pay_1".to_string()),
        payment_status: PaymentStatus::Paid,
        booking_status: BookingStatus::Confirmed,
        notes: None,
        created_at: created,
        updated_at: created,
    })
}

#[test]
fn three_nights_with_ten_percent_coupon() -> TestResult {
    let today = date(2026, 6, 1);
    let stay = StayWindow::new(date(2026, 7, 1), date(2026, 7, 4))?;
    let coupon = coupon(DiscountType::Percentage, dec!(10), dec!(200))?;
    let now: Timestamp = "2026-06-01T12:00:00Z".parse()?;

    assert!(is_coupon_applicable(&coupon, now, dec!(300)));

    let quote = PricingPolicy::default().compute_quote(dec!(100), &stay, today, Some(&coupon))?;

    assert_eq!(quote.subtotal, dec!(300));
    assert_eq!(quote.discount, dec!(30));
    assert_eq!(quote.discounted_subtotal, dec!(270));
    assert_eq!(quote.platform_fee, dec!(75));
    assert_eq!(quote.total, dec!(345));
    assert_eq!(to_minor_units(quote.total, PricingPolicy::default().currency())?, 34_500);

    Ok(())
}

#[test]
fn cancelled_two_days_before_check_in() -> TestResult {
    let stay = StayWindow::new(date(2026, 7, 10), date(2026, 7, 15))?;
    let booking = paid_booking(dec!(1000), stay)?;
    let now = stay
        .check_in_at(Time::midnight(), &TimeZone::UTC)?
        .checked_sub(48.hours())?;

    let decision = Policies::default().refunds().compute_refund(&booking, now)?;

    assert_eq!(decision.refund_amount, dec!(250));
    assert_eq!(decision.refund_percentage, dec!(25));
    assert_eq!(decision.new_booking_status, BookingStatus::Cancelled);
    assert_eq!(decision.new_payment_status, PaymentStatus::Refunded);

    Ok(())
}

#[test]
fn quote_totals_are_consistent_across_rates_and_coupons() -> TestResult {
    let today = date(2026, 6, 1);
    let policy = PricingPolicy::default();

    let coupons = [
        None,
        Some(coupon(DiscountType::Percentage, dec!(15), Decimal::ZERO)?),
        Some(coupon(DiscountType::Percentage, dec!(100), Decimal::ZERO)?),
        Some(coupon(DiscountType::Fixed, dec!(40), Decimal::ZERO)?),
        Some(coupon(DiscountType::Fixed, dec!(10000), Decimal::ZERO)?),
    ];

    for rate in [dec!(0.01), dec!(49.99), dec!(100), dec!(1234.56)] {
        for nights in [1_i32, 2, 7, 30] {
            let check_in = date(2026, 7, 1);
            let stay = StayWindow::new(check_in, check_in.checked_add(nights.days())?)?;

            for coupon in &coupons {
                let quote = policy.compute_quote(rate, &stay, today, coupon.as_ref())?;

                assert_eq!(
                    quote.total,
                    quote.discounted_subtotal + quote.platform_fee,
                    "total must be discounted subtotal plus fee"
                );
                assert!(
                    quote.discounted_subtotal <= quote.subtotal,
                    "discount must not increase the subtotal"
                );
                assert!(
                    quote.discounted_subtotal >= Decimal::ZERO,
                    "discounted subtotal must not go negative"
                );

                let percentage = coupon
                    .as_ref()
                    .filter(|coupon| coupon.discount_type == DiscountType::Percentage);

                if let Some(coupon) = percentage {
                    assert_eq!(
                        quote.discount,
                        quote.subtotal * coupon.discount_value / Decimal::ONE_HUNDRED,
                        "percentage discount must be a share of the subtotal"
                    );
                }
            }
        }
    }

    Ok(())
}

#[test]
fn exhausted_coupon_is_never_applicable() -> TestResult {
    let mut coupon = coupon(DiscountType::Percentage, dec!(10), Decimal::ZERO)?;
    coupon.used_count = coupon.usage_limit;

    assert!(!is_coupon_applicable(
        &coupon,
        "2026-06-01T00:00:00Z".parse()?,
        dec!(10000)
    ));

    Ok(())
}

#[test]
fn cancellation_always_cancels() -> TestResult {
    let stay = StayWindow::new(date(2026, 7, 10), date(2026, 7, 12))?;
    let check_in: Timestamp = "2026-07-10T00:00:00Z".parse()?;
    let policy = RefundPolicy::default();

    for hours_before in [-48_i64, 0, 1, 23, 24, 71, 72, 167, 168, 1000] {
        let booking = paid_booking(dec!(500), stay)?;
        let now = check_in.checked_sub(hours_before.hours())?;
        let decision = policy.compute_refund(&booking, now)?;

        assert_eq!(
            decision.new_booking_status,
            BookingStatus::Cancelled,
            "{hours_before}h before check-in must cancel"
        );
        assert_eq!(
            decision.new_payment_status == PaymentStatus::Refunded,
            decision.refund_amount > Decimal::ZERO,
            "{hours_before}h before check-in: refunded iff money is owed"
        );
    }

    Ok(())
}

#[test]
fn any_single_character_mutation_breaks_signature() -> TestResult {
    let secret = PaymentSecret::new("rzp_test_secret")?;
    let signature = sign_payment("order_abc", "pay_xyz", &secret)?;

    assert!(verify_payment_signature(
        "order_abc",
        "pay_xyz",
        &signature,
        Some(&secret)
    )?);

    for (index, original) in signature.char_indices() {
        let replacement = if original == '0' { '1' } else { '0' };

        let mutated: String = signature
            .chars()
            .enumerate()
            .map(|(i, c)| if i == index { replacement } else { c })
            .collect();

        assert!(
            !verify_payment_signature("order_abc", "pay_xyz", &mutated, Some(&secret))?,
            "mutation at {index} must not verify"
        );
    }

    Ok(())
}
