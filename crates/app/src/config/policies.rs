//! Policy Config

use std::path::PathBuf;

use clap::Args;
use hearth::policies::{Policies, PolicyError};
use tracing::info;

/// Policy file settings.
#[derive(Debug, Clone, Default, Args)]
pub struct PolicyConfig {
    /// YAML file with the currency, platform fee, check-in time and refund tiers
    #[arg(long, env = "HEARTH_POLICY_FILE")]
    pub policy_file: Option<PathBuf>,
}

impl PolicyConfig {
    /// Load the policy file, or the built-in defaults when none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(&self) -> Result<Policies, PolicyError> {
        let Some(path) = &self.policy_file else {
            return Ok(Policies::default());
        };

        let policies = Policies::from_path(path)?;

        info!(path = %path.display(), "loaded policy file");

        Ok(policies)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn no_file_means_defaults() -> TestResult {
        let policies = PolicyConfig::default().load()?;

        assert_eq!(policies.pricing().platform_fee(), dec!(75));

        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let config = PolicyConfig {
            policy_file: Some(PathBuf::from("/nonexistent/hearth-policies.yml")),
        };

        let result = config.load();

        assert!(
            matches!(result, Err(PolicyError::Io(_))),
            "expected Io error, got {result:?}"
        );
    }
}
