//! Policies
//!
//! Pricing and refund rules are configuration, not code. A policy file is YAML:
//!
//! ```yaml
//! currency: EUR
//! platform_fee: "75.00"
//! check_in_time: "15:00"
//! time_zone: UTC
//! refund_tiers:
//!   - { min_hours: 168, percentage: 100 }
//!   - { min_hours: 72, percentage: 50 }
//!   - { min_hours: 24, percentage: 25 }
//! ```

use std::{fs, path::Path, str::FromStr};

use jiff::{civil::Time, tz::TimeZone};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    money::{MoneyError, parse_currency},
    pricing::{PricingError, PricingPolicy},
    refunds::{RefundError, RefundPolicy, RefundSchedule, RefundTier},
};

/// Policy loading errors
#[derive(Debug, Error)]
pub enum PolicyError {
    /// IO error reading the policy file
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse policy YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error(transparent)]
    Currency(#[from] MoneyError),

    /// Amount that is not a decimal number
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Check-in time that is not `HH:MM`
    #[error("invalid check-in time: {0}")]
    InvalidCheckInTime(String),

    /// Time zone that cannot be resolved
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// Pricing rules rejected
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Refund tiers rejected
    #[error(transparent)]
    Refunds(#[from] RefundError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PoliciesFile {
    currency: String,
    platform_fee: String,
    #[serde(default)]
    check_in_time: Option<String>,
    #[serde(default)]
    time_zone: Option<String>,
    refund_tiers: Vec<RefundTier>,
}

/// Pricing and refund rules for a deployment.
#[derive(Debug, Clone, Default)]
pub struct Policies {
    pricing: PricingPolicy,
    refunds: RefundPolicy,
}

impl Policies {
    /// Combine pricing and refund rules.
    pub fn new(pricing: PricingPolicy, refunds: RefundPolicy) -> Self {
        Self { pricing, refunds }
    }

    /// Parse a policy document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any value is invalid.
    pub fn from_yaml_str(contents: &str) -> Result<Self, PolicyError> {
        let file: PoliciesFile = serde_norway::from_str(contents)?;

        file.try_into()
    }

    /// Load a policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or contains invalid values.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Return the pricing rules.
    pub const fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Return the refund rules.
    pub const fn refunds(&self) -> &RefundPolicy {
        &self.refunds
    }
}

impl TryFrom<PoliciesFile> for Policies {
    type Error = PolicyError;

    fn try_from(file: PoliciesFile) -> Result<Self, Self::Error> {
        let currency = parse_currency(&file.currency)?;
        let platform_fee = parse_amount(&file.platform_fee)?;
        let pricing = PricingPolicy::new(platform_fee, currency)?;

        let check_in_time = file
            .check_in_time
            .as_deref()
            .map(parse_check_in_time)
            .transpose()?
            .unwrap_or(Time::midnight());

        let time_zone = file
            .time_zone
            .as_deref()
            .map(parse_time_zone)
            .transpose()?
            .unwrap_or(TimeZone::UTC);

        let schedule = RefundSchedule::new(file.refund_tiers)?;

        Ok(Self {
            pricing,
            refunds: RefundPolicy::new(schedule, check_in_time, time_zone),
        })
    }
}

/// Parse a decimal amount such as `"75.00"`.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidAmount`] if the string is not a decimal number.
pub fn parse_amount(s: &str) -> Result<Decimal, PolicyError> {
    Decimal::from_str(s.trim()).map_err(|_err| PolicyError::InvalidAmount(s.to_string()))
}

fn parse_check_in_time(s: &str) -> Result<Time, PolicyError> {
    s.trim()
        .parse::<Time>()
        .map_err(|_err| PolicyError::InvalidCheckInTime(s.to_string()))
}

fn parse_time_zone(s: &str) -> Result<TimeZone, PolicyError> {
    let name = s.trim();

    if name.eq_ignore_ascii_case("utc") {
        return Ok(TimeZone::UTC);
    }

    TimeZone::get(name).map_err(|_err| PolicyError::UnknownTimeZone(s.to_string()))
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    const POLICY: &str = r#"
currency: GBP
platform_fee: "40.50"
check_in_time: "15:00"
time_zone: UTC
refund_tiers:
  - { min_hours: 24, percentage: 20 }
  - { min_hours: 240, percentage: 100 }
"#;

    #[test]
    fn parses_policy_document() -> TestResult {
        let policies = Policies::from_yaml_str(POLICY)?;

        assert_eq!(policies.pricing().platform_fee(), dec!(40.50));
        assert_eq!(policies.pricing().currency().iso_alpha_code, "GBP");
        assert_eq!(policies.refunds().check_in_time(), time(15, 0, 0, 0));
        assert_eq!(
            policies.refunds().schedule().tiers(),
            &[
                RefundTier::new(240, dec!(100)),
                RefundTier::new(24, dec!(20))
            ]
        );

        Ok(())
    }

    #[test]
    fn check_in_time_defaults_to_midnight() -> TestResult {
        let policies = Policies::from_yaml_str(
            "currency: EUR\nplatform_fee: \"75\"\nrefund_tiers: []\n",
        )?;

        assert_eq!(policies.refunds().check_in_time(), Time::midnight());

        Ok(())
    }

    #[test]
    fn default_fixture_matches_built_in_defaults() -> TestResult {
        let policies = Policies::from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/policies/default.yml"
        ))?;

        let defaults = Policies::default();

        assert_eq!(
            policies.pricing().platform_fee(),
            defaults.pricing().platform_fee()
        );
        assert_eq!(
            policies.pricing().currency().iso_alpha_code,
            defaults.pricing().currency().iso_alpha_code
        );
        assert_eq!(
            policies.refunds().schedule(),
            defaults.refunds().schedule()
        );

        Ok(())
    }

    #[test]
    fn rejects_unknown_currency() {
        let result =
            Policies::from_yaml_str("currency: XQQ\nplatform_fee: \"75\"\nrefund_tiers: []\n");

        assert!(matches!(
            result,
            Err(PolicyError::Currency(MoneyError::UnknownCurrency(_)))
        ));
    }

    #[test]
    fn rejects_malformed_fee() {
        let result =
            Policies::from_yaml_str("currency: EUR\nplatform_fee: \"lots\"\nrefund_tiers: []\n");

        assert!(matches!(result, Err(PolicyError::InvalidAmount(_))));
    }

    #[test]
    fn rejects_negative_fee() {
        let result =
            Policies::from_yaml_str("currency: EUR\nplatform_fee: \"-1\"\nrefund_tiers: []\n");

        assert!(matches!(
            result,
            Err(PolicyError::Pricing(PricingError::InvalidPlatformFee(_)))
        ));
    }

    #[test]
    fn rejects_invalid_tier() {
        let result = Policies::from_yaml_str(
            "currency: EUR\nplatform_fee: \"75\"\nrefund_tiers:\n  - { min_hours: 1, percentage: 101 }\n",
        );

        assert!(matches!(
            result,
            Err(PolicyError::Refunds(RefundError::InvalidTier { .. }))
        ));
    }

    #[test]
    fn rejects_invalid_check_in_time() {
        let result = Policies::from_yaml_str(
            "currency: EUR\nplatform_fee: \"75\"\ncheck_in_time: \"teatime\"\nrefund_tiers: []\n",
        );

        assert!(matches!(result, Err(PolicyError::InvalidCheckInTime(_))));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = Policies::from_yaml_str(
            "currency: EUR\nplatform_fee: \"75\"\nrefund_tiers: []\nsurcharge: 10\n",
        );

        assert!(matches!(result, Err(PolicyError::Yaml(_))));
    }
}
