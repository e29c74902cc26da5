use std::io;

use clap::Args;
use hearth::{
    coupons::{Coupon, DiscountType},
    stays::StayWindow,
};
use hearth_app::config::AppConfig;
use jiff::{Timestamp, Zoned, civil::Date};
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Nightly rate in major currency units
    #[arg(long)]
    nightly_rate: Decimal,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long)]
    check_in: Date,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long)]
    check_out: Date,

    /// Day the quote is made; defaults to today in the policy time zone
    #[arg(long)]
    today: Option<Date>,

    /// Percentage coupon discount
    #[arg(long, conflicts_with = "amount_off")]
    percent_off: Option<Decimal>,

    /// Fixed coupon discount in major currency units
    #[arg(long)]
    amount_off: Option<Decimal>,

    /// Minimum subtotal the coupon needs
    #[arg(long, default_value_t = Decimal::ZERO)]
    min_order_value: Decimal,

    /// Print the quote as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl QuoteArgs {
    fn coupon(&self) -> Option<Coupon> {
        let (discount_type, discount_value) = match (self.percent_off, self.amount_off) {
            (Some(percent), _) => (DiscountType::Percentage, percent),
            (None, Some(amount)) => (DiscountType::Fixed, amount),
            (None, None) => return None,
        };

        Some(Coupon {
            code: "CLI".to_string(),
            discount_type,
            discount_value,
            expires_at: Timestamp::MAX,
            usage_limit: 1,
            used_count: 0,
            min_order_value: self.min_order_value,
        })
    }
}

pub(crate) fn run(config: &AppConfig, args: &QuoteArgs) -> Result<(), String> {
    let policies = config
        .load_policies()
        .map_err(|error| format!("failed to load policies: {error}"))?;

    let today = args.today.unwrap_or_else(|| {
        Zoned::now()
            .with_time_zone(policies.refunds().time_zone().clone())
            .date()
    });

    let stay = StayWindow::new(args.check_in, args.check_out)
        .map_err(|error| format!("invalid stay: {error}"))?;

    let coupon = args.coupon();

    let quote = policies
        .pricing()
        .compute_quote(args.nightly_rate, &stay, today, coupon.as_ref())
        .map_err(|error| format!("failed to price stay: {error}"))?;

    if args.json {
        return super::print_json(&quote.rounded());
    }

    quote
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to write quote: {error}"))
}
