//! Coupons Repository

use async_trait::async_trait;
use hearth::coupons::Coupon;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::domain::coupons::errors::CouponsError;

/// In-memory coupons store.
#[derive(Debug, Default)]
pub struct InMemoryCouponsRepository {
    coupons: RwLock<FxHashMap<String, Coupon>>,
}

impl InMemoryCouponsRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Codes are matched case-insensitively, the way travelers type them.
fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[async_trait]
impl CouponsRepository for InMemoryCouponsRepository {
    async fn create_coupon(&self, mut coupon: Coupon) -> Result<Coupon, CouponsError> {
        coupon.code = normalize_code(&coupon.code);

        let mut coupons = self.coupons.write().await;

        if coupons.contains_key(&coupon.code) {
            return Err(CouponsError::AlreadyExists);
        }

        coupons.insert(coupon.code.clone(), coupon.clone());

        Ok(coupon)
    }

    async fn get_coupon(&self, code: &str) -> Result<Coupon, CouponsError> {
        self.coupons
            .read()
            .await
            .get(&normalize_code(code))
            .cloned()
            .ok_or(CouponsError::NotFound)
    }

    async fn redeem(&self, code: &str, now: Timestamp) -> Result<Coupon, CouponsError> {
        let mut coupons = self.coupons.write().await;

        let coupon = coupons
            .get_mut(&normalize_code(code))
            .ok_or(CouponsError::NotFound)?;

        if now > coupon.expires_at {
            return Err(CouponsError::Expired);
        }

        if !coupon.has_redemptions_left() {
            return Err(CouponsError::Exhausted);
        }

        coupon.used_count += 1;

        Ok(coupon.clone())
    }
}

/// Coupon storage.
#[automock]
#[async_trait]
pub trait CouponsRepository: Send + Sync {
    /// Store a new coupon. Codes are stored upper-cased and looked up case-insensitively.
    async fn create_coupon(&self, coupon: Coupon) -> Result<Coupon, CouponsError>;

    /// Retrieve a coupon by code.
    async fn get_coupon(&self, code: &str) -> Result<Coupon, CouponsError>;

    /// Use one redemption of a coupon.
    ///
    /// The limit check and the increment are a single atomic step, so concurrent redemptions
    /// can never push `used_count` past `usage_limit`.
    async fn redeem(&self, code: &str, now: Timestamp) -> Result<Coupon, CouponsError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hearth::coupons::DiscountType;
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    fn coupon(usage_limit: u32) -> TestResult<Coupon> {
        Ok(Coupon {
            code: "SPRING".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: dec!(20),
            expires_at: "2026-12-31T00:00:00Z".parse()?,
            usage_limit,
            used_count: 0,
            min_order_value: dec!(0),
        })
    }

    #[tokio::test]
    async fn redeem_increments_used_count() -> TestResult {
        let repository = InMemoryCouponsRepository::new();
        repository.create_coupon(coupon(2)?).await?;

        let redeemed = repository
            .redeem("SPRING", "2026-06-01T00:00:00Z".parse()?)
            .await?;

        assert_eq!(redeemed.used_count, 1);
        assert_eq!(repository.get_coupon("SPRING").await?.used_count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn redeem_stops_at_usage_limit() -> TestResult {
        let repository = InMemoryCouponsRepository::new();
        let now: Timestamp = "2026-06-01T00:00:00Z".parse()?;
        repository.create_coupon(coupon(1)?).await?;

        repository.redeem("SPRING", now).await?;

        assert_eq!(
            repository.redeem("SPRING", now).await,
            Err(CouponsError::Exhausted)
        );

        Ok(())
    }

    #[tokio::test]
    async fn redeem_rejects_expired_coupon() -> TestResult {
        let repository = InMemoryCouponsRepository::new();
        repository.create_coupon(coupon(5)?).await?;

        let result = repository
            .redeem("SPRING", "2027-01-01T00:00:00Z".parse()?)
            .await;

        assert_eq!(result, Err(CouponsError::Expired));

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_redemptions_never_exceed_limit() -> TestResult {
        let repository = Arc::new(InMemoryCouponsRepository::new());
        let now: Timestamp = "2026-06-01T00:00:00Z".parse()?;
        repository.create_coupon(coupon(3)?).await?;

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repository = Arc::clone(&repository);

                tokio::spawn(async move { repository.redeem("SPRING", now).await })
            })
            .collect();

        let mut redeemed = 0;

        for handle in handles {
            if handle.await?.is_ok() {
                redeemed += 1;
            }
        }

        assert_eq!(redeemed, 3);
        assert_eq!(repository.get_coupon("SPRING").await?.used_count, 3);

        Ok(())
    }

    #[tokio::test]
    async fn codes_match_regardless_of_case() -> TestResult {
        let repository = InMemoryCouponsRepository::new();
        let mut lowercase = coupon(2)?;
        lowercase.code = "summer10".to_string();

        let stored = repository.create_coupon(lowercase).await?;

        assert_eq!(stored.code, "SUMMER10");
        assert_eq!(repository.get_coupon("SUMMER10").await?.code, "SUMMER10");
        assert_eq!(repository.get_coupon("Summer10").await?.code, "SUMMER10");

        let redeemed = repository
            .redeem("summer10", "2026-06-01T00:00:00Z".parse()?)
            .await?;

        assert_eq!(redeemed.used_count, 1);

        let mut duplicate = coupon(2)?;
        duplicate.code = "SUMMER10".to_string();

        assert_eq!(
            repository.create_coupon(duplicate).await,
            Err(CouponsError::AlreadyExists)
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let repository = InMemoryCouponsRepository::new();

        let result = repository.get_coupon("NOPE").await;

        assert_eq!(result, Err(CouponsError::NotFound));
    }
}
