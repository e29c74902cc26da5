//! Bookings Repository

use async_trait::async_trait;
use hearth::{
    bookings::{Booking, BookingStatus, BookingUuid, PaymentStatus, PropertyUuid, UserUuid},
    stays::StayWindow,
};
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::RwLock;

use crate::domain::bookings::{errors::BookingsRepositoryError, models::BookingState};

#[derive(Debug, Default)]
struct Store {
    bookings: FxHashMap<BookingUuid, Booking>,

    /// Bookings with a cancellation claimed but not yet finished or aborted.
    cancelling: FxHashSet<BookingUuid>,
}

impl Store {
    /// The stored booking, unless a cancellation currently holds it.
    fn unclaimed_mut(
        &mut self,
        booking: BookingUuid,
    ) -> Result<&mut Booking, BookingsRepositoryError> {
        if self.cancelling.contains(&booking) {
            return Err(BookingsRepositoryError::Cancelling);
        }

        self.bookings
            .get_mut(&booking)
            .ok_or(BookingsRepositoryError::NotFound)
    }
}

/// In-memory bookings store.
#[derive(Debug, Default)]
pub struct InMemoryBookingsRepository {
    store: RwLock<Store>,
}

impl InMemoryBookingsRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn blocks_stay(booking: &Booking, property: PropertyUuid, stay: &StayWindow) -> bool {
    booking.property == property
        && booking.booking_status != BookingStatus::Cancelled
        && booking.stay.overlaps(stay)
}

#[async_trait]
impl BookingsRepository for InMemoryBookingsRepository {
    async fn create_booking(&self, booking: Booking) -> Result<Booking, BookingsRepositoryError> {
        let mut store = self.store.write().await;
        let bookings = &mut store.bookings;

        if bookings.contains_key(&booking.uuid) {
            return Err(BookingsRepositoryError::AlreadyExists);
        }

        if bookings
            .values()
            .any(|existing| blocks_stay(existing, booking.property, &booking.stay))
        {
            return Err(BookingsRepositoryError::Unavailable);
        }

        bookings.insert(booking.uuid, booking.clone());

        Ok(booking)
    }

    async fn get_booking(&self, booking: BookingUuid) -> Result<Booking, BookingsRepositoryError> {
        self.store
            .read()
            .await
            .bookings
            .get(&booking)
            .cloned()
            .ok_or(BookingsRepositoryError::NotFound)
    }

    async fn list_traveler_bookings(
        &self,
        traveler: UserUuid,
    ) -> Result<Vec<Booking>, BookingsRepositoryError> {
        let mut bookings: Vec<Booking> = self
            .store
            .read()
            .await
            .bookings
            .values()
            .filter(|booking| booking.traveler == traveler)
            .cloned()
            .collect();

        bookings.sort_by_key(|booking| booking.created_at);

        Ok(bookings)
    }

    async fn is_available(
        &self,
        property: PropertyUuid,
        stay: StayWindow,
    ) -> Result<bool, BookingsRepositoryError> {
        Ok(!self
            .store
            .read()
            .await
            .bookings
            .values()
            .any(|existing| blocks_stay(existing, property, &stay)))
    }

    async fn transition(
        &self,
        booking: BookingUuid,
        expected: BookingState,
        next: BookingState,
        now: Timestamp,
    ) -> Result<Booking, BookingsRepositoryError> {
        let mut store = self.store.write().await;

        let stored = store.unclaimed_mut(booking)?;

        let actual = BookingState::of(stored);

        if actual != expected {
            return Err(BookingsRepositoryError::Conflict { expected, actual });
        }

        stored.booking_status = next.booking_status;
        stored.payment_status = next.payment_status;
        stored.updated_at = now;

        Ok(stored.clone())
    }

    async fn mark_paid(
        &self,
        booking: BookingUuid,
        order_id: &str,
        payment_id: &str,
        now: Timestamp,
    ) -> Result<Booking, BookingsRepositoryError> {
        let mut store = self.store.write().await;

        let stored = store.unclaimed_mut(booking)?;

        if stored.order_id.as_deref() != Some(order_id) {
            return Err(BookingsRepositoryError::OrderMismatch);
        }

        let actual = BookingState::of(stored);

        if actual.payment_status != PaymentStatus::Pending
            || actual.booking_status == BookingStatus::Cancelled
        {
            return Err(BookingsRepositoryError::Conflict {
                expected: BookingState::new(actual.booking_status, PaymentStatus::Pending),
                actual,
            });
        }

        stored.payment_status = PaymentStatus::Paid;
        stored.payment_id = Some(payment_id.to_string());
        stored.updated_at = now;

        Ok(stored.clone())
    }

    async fn begin_cancellation(
        &self,
        booking: BookingUuid,
        expected: BookingState,
    ) -> Result<Booking, BookingsRepositoryError> {
        let mut store = self.store.write().await;

        let stored = store.unclaimed_mut(booking)?;

        let actual = BookingState::of(stored);

        if actual != expected {
            return Err(BookingsRepositoryError::Conflict { expected, actual });
        }

        let claimed = stored.clone();

        store.cancelling.insert(booking);

        Ok(claimed)
    }

    async fn finish_cancellation(
        &self,
        booking: BookingUuid,
        next: BookingState,
        now: Timestamp,
    ) -> Result<Booking, BookingsRepositoryError> {
        let mut store = self.store.write().await;

        if !store.cancelling.remove(&booking) {
            return Err(BookingsRepositoryError::NotCancelling);
        }

        let stored = store
            .bookings
            .get_mut(&booking)
            .ok_or(BookingsRepositoryError::NotFound)?;

        stored.booking_status = next.booking_status;
        stored.payment_status = next.payment_status;
        stored.updated_at = now;

        Ok(stored.clone())
    }

    async fn abort_cancellation(&self, booking: BookingUuid) -> Result<(), BookingsRepositoryError> {
        if self.store.write().await.cancelling.remove(&booking) {
            Ok(())
        } else {
            Err(BookingsRepositoryError::NotCancelling)
        }
    }
}

/// Booking storage.
///
/// Status changes go through compare-and-set operations so concurrent requests against the same
/// booking serialize: exactly one of them observes the state it expected.
///
/// Cancellation is split in two so money can move in between. [`begin_cancellation`] claims the
/// booking; while the claim is held every other status change, including a second claim, fails
/// with `Cancelling`. The claim is released by [`finish_cancellation`] or
/// [`abort_cancellation`].
///
/// [`begin_cancellation`]: BookingsRepository::begin_cancellation
/// [`finish_cancellation`]: BookingsRepository::finish_cancellation
/// [`abort_cancellation`]: BookingsRepository::abort_cancellation
#[automock]
#[async_trait]
pub trait BookingsRepository: Send + Sync {
    /// Store a new booking, unless its property is already booked for any of its nights.
    async fn create_booking(&self, booking: Booking) -> Result<Booking, BookingsRepositoryError>;

    /// Retrieve a single booking.
    async fn get_booking(&self, booking: BookingUuid) -> Result<Booking, BookingsRepositoryError>;

    /// All bookings made by a traveler, oldest first.
    async fn list_traveler_bookings(
        &self,
        traveler: UserUuid,
    ) -> Result<Vec<Booking>, BookingsRepositoryError>;

    /// Whether no live booking of `property` overlaps `stay`.
    async fn is_available(
        &self,
        property: PropertyUuid,
        stay: StayWindow,
    ) -> Result<bool, BookingsRepositoryError>;

    /// Move a booking from `expected` to `next`, failing with `Conflict` if it is not in
    /// `expected`.
    async fn transition(
        &self,
        booking: BookingUuid,
        expected: BookingState,
        next: BookingState,
        now: Timestamp,
    ) -> Result<Booking, BookingsRepositoryError>;

    /// Record a verified payment against the booking's order, moving payment `Pending → Paid`.
    async fn mark_paid(
        &self,
        booking: BookingUuid,
        order_id: &str,
        payment_id: &str,
        now: Timestamp,
    ) -> Result<Booking, BookingsRepositoryError>;

    /// Claim a booking in `expected` for cancellation, returning it as claimed.
    async fn begin_cancellation(
        &self,
        booking: BookingUuid,
        expected: BookingState,
    ) -> Result<Booking, BookingsRepositoryError>;

    /// Write the final state of a claimed cancellation and release the claim.
    async fn finish_cancellation(
        &self,
        booking: BookingUuid,
        next: BookingState,
        now: Timestamp,
    ) -> Result<Booking, BookingsRepositoryError>;

    /// Release a claim without changing the booking.
    async fn abort_cancellation(&self, booking: BookingUuid) -> Result<(), BookingsRepositoryError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::civil::date;
    use testresult::TestResult;

    use crate::test::pending_booking;

    use super::*;

    #[tokio::test]
    async fn create_then_get_returns_booking() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let booking = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;

        repository.create_booking(booking.clone()).await?;

        assert_eq!(repository.get_booking(booking.uuid).await?, booking);

        Ok(())
    }

    #[tokio::test]
    async fn overlapping_booking_is_unavailable() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let property = PropertyUuid::new();

        repository
            .create_booking(pending_booking(property, date(2026, 7, 1), date(2026, 7, 4))?)
            .await?;

        let result = repository
            .create_booking(pending_booking(property, date(2026, 7, 3), date(2026, 7, 6))?)
            .await;

        assert_eq!(result, Err(BookingsRepositoryError::Unavailable));

        let back_to_back = pending_booking(property, date(2026, 7, 4), date(2026, 7, 6))?;

        repository.create_booking(back_to_back).await?;

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_booking_frees_its_nights() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let property = PropertyUuid::new();
        let booking = pending_booking(property, date(2026, 7, 1), date(2026, 7, 4))?;

        repository.create_booking(booking.clone()).await?;

        let stay = booking.stay;

        assert!(!repository.is_available(property, stay).await?);

        repository
            .transition(
                booking.uuid,
                BookingState::of(&booking),
                BookingState::new(BookingStatus::Cancelled, PaymentStatus::Pending),
                Timestamp::now(),
            )
            .await?;

        assert!(repository.is_available(property, stay).await?);

        Ok(())
    }

    #[tokio::test]
    async fn transition_from_stale_state_conflicts() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let booking = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;

        repository.create_booking(booking.clone()).await?;

        let stale = BookingState::new(BookingStatus::Confirmed, PaymentStatus::Paid);
        let result = repository
            .transition(
                booking.uuid,
                stale,
                BookingState::new(BookingStatus::Cancelled, PaymentStatus::Refunded),
                Timestamp::now(),
            )
            .await;

        assert!(
            matches!(result, Err(BookingsRepositoryError::Conflict { .. })),
            "expected Conflict, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_cancellations_only_one_wins() -> TestResult {
        let repository = Arc::new(InMemoryBookingsRepository::new());
        let booking = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;
        let expected = BookingState::of(&booking);
        let cancelled = BookingState::new(BookingStatus::Cancelled, PaymentStatus::Pending);

        let uuid = booking.uuid;

        repository.create_booking(booking).await?;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repository = Arc::clone(&repository);

                tokio::spawn(async move {
                    repository
                        .transition(uuid, expected, cancelled, Timestamp::now())
                        .await
                })
            })
            .collect();

        let mut winners = 0;

        for handle in handles {
            if handle.await?.is_ok() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);

        Ok(())
    }

    #[tokio::test]
    async fn claimed_booking_rejects_other_changes() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let booking = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;
        let expected = BookingState::of(&booking);

        repository.create_booking(booking.clone()).await?;

        let claimed = repository.begin_cancellation(booking.uuid, expected).await?;

        assert_eq!(claimed, booking);

        assert_eq!(
            repository.begin_cancellation(booking.uuid, expected).await,
            Err(BookingsRepositoryError::Cancelling)
        );
        assert_eq!(
            repository
                .transition(
                    booking.uuid,
                    expected,
                    BookingState::new(BookingStatus::Confirmed, PaymentStatus::Pending),
                    Timestamp::now(),
                )
                .await,
            Err(BookingsRepositoryError::Cancelling)
        );
        assert_eq!(
            repository
                .mark_paid(booking.uuid, "order_test", "pay_1", Timestamp::now())
                .await,
            Err(BookingsRepositoryError::Cancelling)
        );

        let cancelled = repository
            .finish_cancellation(
                booking.uuid,
                BookingState::new(BookingStatus::Cancelled, PaymentStatus::Pending),
                Timestamp::now(),
            )
            .await?;

        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert_eq!(
            repository.abort_cancellation(booking.uuid).await,
            Err(BookingsRepositoryError::NotCancelling)
        );

        Ok(())
    }

    #[tokio::test]
    async fn aborted_cancellation_releases_claim() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let booking = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;
        let expected = BookingState::of(&booking);

        repository.create_booking(booking.clone()).await?;
        repository.begin_cancellation(booking.uuid, expected).await?;
        repository.abort_cancellation(booking.uuid).await?;

        let stored = repository.get_booking(booking.uuid).await?;

        assert_eq!(stored, booking);

        repository.begin_cancellation(booking.uuid, expected).await?;

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_claims_only_one_wins() -> TestResult {
        let repository = Arc::new(InMemoryBookingsRepository::new());
        let booking = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;
        let expected = BookingState::of(&booking);
        let uuid = booking.uuid;

        repository.create_booking(booking).await?;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repository = Arc::clone(&repository);

                tokio::spawn(async move { repository.begin_cancellation(uuid, expected).await })
            })
            .collect();

        let mut claims = 0;

        for handle in handles {
            if handle.await?.is_ok() {
                claims += 1;
            }
        }

        assert_eq!(claims, 1);

        Ok(())
    }

    #[tokio::test]
    async fn mark_paid_requires_matching_order() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let booking = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;

        repository.create_booking(booking.clone()).await?;

        let result = repository
            .mark_paid(booking.uuid, "order_other", "pay_1", Timestamp::now())
            .await;

        assert_eq!(result, Err(BookingsRepositoryError::OrderMismatch));

        let paid = repository
            .mark_paid(booking.uuid, "order_test", "pay_1", Timestamp::now())
            .await?;

        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.payment_id.as_deref(), Some("pay_1"));

        let again = repository
            .mark_paid(booking.uuid, "order_test", "pay_2", Timestamp::now())
            .await;

        assert!(
            matches!(again, Err(BookingsRepositoryError::Conflict { .. })),
            "expected Conflict, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_traveler_bookings_filters_by_traveler() -> TestResult {
        let repository = InMemoryBookingsRepository::new();
        let first = pending_booking(PropertyUuid::new(), date(2026, 7, 1), date(2026, 7, 4))?;
        let mut second = pending_booking(PropertyUuid::new(), date(2026, 8, 1), date(2026, 8, 4))?;
        second.traveler = first.traveler;
        let other = pending_booking(PropertyUuid::new(), date(2026, 9, 1), date(2026, 9, 4))?;

        repository.create_booking(first.clone()).await?;
        repository.create_booking(second.clone()).await?;
        repository.create_booking(other).await?;

        let listed = repository.list_traveler_bookings(first.traveler).await?;

        assert_eq!(listed.len(), 2);

        Ok(())
    }
}
