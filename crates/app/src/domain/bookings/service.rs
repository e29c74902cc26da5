//! Bookings service.

use std::sync::Arc;

use async_trait::async_trait;
use hearth::{
    bookings::{
        Booking, BookingStatus, BookingUuid, PaymentStatus, PriceSnapshot, UserUuid,
    },
    coupons::{Coupon, is_coupon_applicable},
    money::{round_for_display, to_minor_units},
    payments::{PaymentSecret, verify_payment_signature},
    policies::Policies,
    pricing::Quote,
    refunds::RefundDecision,
};
use jiff::{Timestamp, civil::Date};
use mockall::automock;
use tracing::{Span, error, info, warn};

use crate::{
    domain::{
        bookings::{
            errors::BookingsServiceError,
            models::{BookingState, Cancellation},
            repository::BookingsRepository,
        },
        coupons::CouponsRepository,
        properties::{PropertiesRepository, models::Property},
    },
    gateway::{GatewayRefund, PaymentGateway},
    requests::{BookingRequest, PaymentConfirmation, QuoteRequest, ValidQuoteRequest},
};

/// Bookings service backed by repository and gateway collaborators.
#[derive(Clone)]
pub struct StoreBookingsService {
    properties: Arc<dyn PropertiesRepository>,
    bookings: Arc<dyn BookingsRepository>,
    coupons: Arc<dyn CouponsRepository>,
    gateway: Arc<dyn PaymentGateway>,
    policies: Policies,
    payment_secret: Option<PaymentSecret>,
}

impl StoreBookingsService {
    /// Create a service over the given collaborators.
    ///
    /// Without a `payment_secret`, quoting, booking and cancelling work but payment confirmation
    /// fails with a configuration error.
    #[must_use]
    pub fn new(
        properties: Arc<dyn PropertiesRepository>,
        bookings: Arc<dyn BookingsRepository>,
        coupons: Arc<dyn CouponsRepository>,
        gateway: Arc<dyn PaymentGateway>,
        policies: Policies,
        payment_secret: Option<PaymentSecret>,
    ) -> Self {
        Self {
            properties,
            bookings,
            coupons,
            gateway,
            policies,
            payment_secret,
        }
    }

    /// Policies the service prices and refunds with.
    #[must_use]
    pub const fn policies(&self) -> &Policies {
        &self.policies
    }

    /// The calendar day `now` falls on in the policy time zone.
    fn today(&self, now: Timestamp) -> Date {
        now.to_zoned(self.policies.refunds().time_zone().clone())
            .date()
    }

    /// Price a validated request, returning the property, the quote and the coupon that was
    /// actually applied.
    async fn price(
        &self,
        request: &ValidQuoteRequest,
        today: Date,
        now: Timestamp,
    ) -> Result<(Property, Quote, Option<Coupon>), BookingsServiceError> {
        let property = self.properties.get_property(request.property).await?;

        let coupon = match &request.coupon_code {
            Some(code) => Some(self.coupons.get_coupon(code).await?),
            None => None,
        };

        let pricing = self.policies.pricing();

        let base = pricing.compute_quote(property.nightly_rate, &request.stay, today, None)?;

        let coupon = coupon.filter(|coupon| is_coupon_applicable(coupon, now, base.subtotal));

        let Some(coupon) = coupon else {
            return Ok((property, base, None));
        };

        let quote =
            pricing.compute_quote(property.nightly_rate, &request.stay, today, Some(&coupon))?;

        let applied = quote.coupon_applied.then_some(coupon);

        Ok((property, quote, applied))
    }

    /// Return the refund owed on a captured payment through the gateway. Bookings that were
    /// never paid, or are owed nothing, move no money.
    async fn execute_refund(
        &self,
        booking: &Booking,
        decision: &RefundDecision,
    ) -> Result<Option<GatewayRefund>, BookingsServiceError> {
        let captured = booking
            .payment_id
            .as_deref()
            .filter(|_| booking.payment_status == PaymentStatus::Paid);

        let Some(payment_id) = captured.filter(|_| decision.owes_refund()) else {
            return Ok(None);
        };

        let currency = self.policies.pricing().currency();
        let amount_minor = to_minor_units(decision.refund_amount, currency)?;

        Ok(Some(self.gateway.refund(payment_id, amount_minor).await?))
    }
}

impl std::fmt::Debug for StoreBookingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBookingsService")
            .field("policies", &self.policies)
            .field("payment_secret", &self.payment_secret)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BookingsService for StoreBookingsService {
    #[tracing::instrument(
        name = "bookings.service.quote",
        skip(self, request),
        fields(property = %request.property, total = tracing::field::Empty),
        err
    )]
    async fn quote(
        &self,
        request: QuoteRequest,
        now: Timestamp,
    ) -> Result<Quote, BookingsServiceError> {
        let today = self.today(now);
        let request = request.validate(today)?;

        let (_, quote, _) = self.price(&request, today, now).await?;

        Span::current().record("total", tracing::field::display(quote.rounded().total));

        Ok(quote)
    }

    #[tracing::instrument(
        name = "bookings.service.create_booking",
        skip(self, request),
        fields(
            property = %request.property,
            traveler = %request.traveler,
            booking = tracing::field::Empty,
            order_id = tracing::field::Empty,
        ),
        err
    )]
    async fn create_booking(
        &self,
        request: BookingRequest,
        now: Timestamp,
    ) -> Result<Booking, BookingsServiceError> {
        let today = self.today(now);
        let request = request.validate(today)?;

        let (property, quote, coupon) = self.price(&request.quote(), today, now).await?;

        let requested = request.occupancy.total();

        if requested > property.max_guests {
            return Err(BookingsServiceError::OverCapacity {
                requested,
                max_guests: property.max_guests,
            });
        }

        if !self
            .bookings
            .is_available(request.property, request.stay)
            .await?
        {
            return Err(BookingsServiceError::Unavailable);
        }

        let uuid = BookingUuid::new();
        let total = round_for_display(quote.total);
        let amount_minor = to_minor_units(total, quote.currency)?;

        let order = self
            .gateway
            .create_order(amount_minor, quote.currency.iso_alpha_code, &uuid.to_string())
            .await?;

        let booking = Booking {
            uuid,
            property: property.uuid,
            traveler: request.traveler,
            host: property.host,
            stay: request.stay,
            occupancy: request.occupancy,
            travelers: request.travelers,
            price: PriceSnapshot {
                nightly_rate: quote.nightly_rate,
                total_nights: quote.total_nights,
                total,
            },
            coupon_code: coupon.as_ref().map(|coupon| coupon.code.clone()),
            order_id: Some(order.id),
            payment_id: None,
            payment_status: PaymentStatus::Pending,
            booking_status: BookingStatus::Pending,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        booking.validate()?;

        let created = self.bookings.create_booking(booking).await?;

        if let Some(coupon) = coupon {
            let redeemed = self.coupons.redeem(&coupon.code, now).await;

            if let Err(redeem_error) = redeemed {
                warn!(
                    booking = %created.uuid,
                    coupon = %coupon.code,
                    error = %redeem_error,
                    "coupon could not be redeemed after booking"
                );
            }
        }

        let span = Span::current();
        span.record("booking", tracing::field::display(created.uuid));

        if let Some(order_id) = &created.order_id {
            span.record("order_id", tracing::field::display(order_id));
        }

        info!(total = %total, nights = quote.total_nights, "created booking");

        Ok(created)
    }

    #[tracing::instrument(
        name = "bookings.service.confirm_payment",
        skip(self, confirmation),
        fields(order_id = %confirmation.order_id, payment_id = %confirmation.payment_id),
        err
    )]
    async fn confirm_payment(
        &self,
        booking: BookingUuid,
        confirmation: PaymentConfirmation,
        now: Timestamp,
    ) -> Result<Booking, BookingsServiceError> {
        let verified = verify_payment_signature(
            &confirmation.order_id,
            &confirmation.payment_id,
            &confirmation.signature,
            self.payment_secret.as_ref(),
        )?;

        if !verified {
            warn!("rejected payment with invalid signature");

            return Err(BookingsServiceError::InvalidSignature);
        }

        let paid = self
            .bookings
            .mark_paid(
                booking,
                &confirmation.order_id,
                &confirmation.payment_id,
                now,
            )
            .await?;

        info!("payment confirmed");

        Ok(paid)
    }

    #[tracing::instrument(name = "bookings.service.confirm_booking", skip(self), err)]
    async fn confirm_booking(
        &self,
        booking: BookingUuid,
        now: Timestamp,
    ) -> Result<Booking, BookingsServiceError> {
        let current = self.bookings.get_booking(booking).await?;

        if current.booking_status != BookingStatus::Pending {
            return Err(BookingsServiceError::Conflict);
        }

        let expected = BookingState::of(&current);
        let next = BookingState::new(BookingStatus::Confirmed, current.payment_status);

        let confirmed = self
            .bookings
            .transition(booking, expected, next, now)
            .await?;

        info!("booking confirmed");

        Ok(confirmed)
    }

    #[tracing::instrument(
        name = "bookings.service.cancel_booking",
        skip(self),
        fields(
            refund_amount = tracing::field::Empty,
            refund_id = tracing::field::Empty,
        ),
        err
    )]
    async fn cancel_booking(
        &self,
        booking: BookingUuid,
        now: Timestamp,
    ) -> Result<Cancellation, BookingsServiceError> {
        let current = self.bookings.get_booking(booking).await?;

        let mut decision = self.policies.refunds().compute_refund(&current, now)?;

        let claimed = self
            .bookings
            .begin_cancellation(booking, BookingState::of(&current))
            .await?;

        Span::current().record(
            "refund_amount",
            tracing::field::display(decision.refund_amount),
        );

        let refund = match self.execute_refund(&claimed, &decision).await {
            Ok(refund) => refund,
            Err(refund_error) => {
                let released = self.bookings.abort_cancellation(booking).await;

                if let Err(store_error) = released {
                    error!(error = %store_error, "cancellation claim could not be released");
                }

                return Err(refund_error);
            }
        };

        decision.new_payment_status = if refund.is_some() {
            PaymentStatus::Refunded
        } else {
            claimed.payment_status
        };

        let next = BookingState::new(BookingStatus::Cancelled, decision.new_payment_status);

        let cancelled = match self.bookings.finish_cancellation(booking, next, now).await {
            Ok(cancelled) => cancelled,
            Err(store_error) => {
                if let Some(refund) = &refund {
                    error!(
                        refund_id = %refund.id,
                        error = %store_error,
                        "refund executed but booking could not be cancelled"
                    );
                }

                return Err(store_error.into());
            }
        };

        let refund_id = refund.map(|refund| refund.id);

        if let Some(refund_id) = &refund_id {
            Span::current().record("refund_id", tracing::field::display(refund_id));
        }

        info!(
            refund_percentage = %decision.refund_percentage,
            "booking cancelled"
        );

        Ok(Cancellation {
            booking: cancelled,
            decision,
            refund_id,
        })
    }

    async fn get_booking(&self, booking: BookingUuid) -> Result<Booking, BookingsServiceError> {
        Ok(self.bookings.get_booking(booking).await?)
    }

    async fn list_traveler_bookings(
        &self,
        traveler: UserUuid,
    ) -> Result<Vec<Booking>, BookingsServiceError> {
        Ok(self.bookings.list_traveler_bookings(traveler).await?)
    }
}

/// Booking lifecycle operations.
#[automock]
#[async_trait]
pub trait BookingsService: Send + Sync {
    /// Price a stay without reserving it.
    async fn quote(&self, request: QuoteRequest, now: Timestamp)
    -> Result<Quote, BookingsServiceError>;

    /// Reserve a stay: price it, open a gateway order and store a pending booking.
    ///
    /// The coupon, if one applied, is redeemed only once the booking is stored. A redemption
    /// that then fails, because concurrent bookings used up the coupon in between, is logged and
    /// the booking keeps its discount. Concurrent bookings can therefore redeem a coupon more
    /// often than its `usage_limit` allows.
    async fn create_booking(
        &self,
        request: BookingRequest,
        now: Timestamp,
    ) -> Result<Booking, BookingsServiceError>;

    /// Record a gateway payment after verifying its signature.
    ///
    /// This is the only way a booking becomes paid.
    async fn confirm_payment(
        &self,
        booking: BookingUuid,
        confirmation: PaymentConfirmation,
        now: Timestamp,
    ) -> Result<Booking, BookingsServiceError>;

    /// Host acceptance of a pending booking.
    async fn confirm_booking(
        &self,
        booking: BookingUuid,
        now: Timestamp,
    ) -> Result<Booking, BookingsServiceError>;

    /// Cancel a booking, refunding what the policy allows.
    ///
    /// The booking is claimed before any money moves, so of two concurrent cancellations only
    /// one reaches the gateway and the other fails with `Conflict`. It is only marked cancelled
    /// once the gateway has confirmed any refund; a gateway failure releases the claim and leaves
    /// the booking untouched so the cancellation can be retried.
    async fn cancel_booking(
        &self,
        booking: BookingUuid,
        now: Timestamp,
    ) -> Result<Cancellation, BookingsServiceError>;

    /// Retrieve a single booking.
    async fn get_booking(&self, booking: BookingUuid) -> Result<Booking, BookingsServiceError>;

    /// All bookings made by a traveler, oldest first.
    async fn list_traveler_bookings(
        &self,
        traveler: UserUuid,
    ) -> Result<Vec<Booking>, BookingsServiceError>;
}
