use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_MAX_ARTICLES: usize = 30;
pub const DEFAULT_BUDGET_USD: f64 = 0.25;
pub const DEFAULT_COST_PER_CALL_USD: f64 = 0.01;
pub const DEFAULT_PACING: Duration = Duration::from_secs(2);

/// Values that stay fixed for the lifetime of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Upper bound on the number of articles attempted in a run.
    pub max_articles: usize,
    /// Spend ceiling in USD.
    pub budget_usd: f64,
    /// Flat estimate charged for every successful analysis call.
    pub cost_per_call_usd: f64,
    /// Pause between consecutive backend calls.
    pub pacing: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_articles: DEFAULT_MAX_ARTICLES,
            budget_usd: DEFAULT_BUDGET_USD,
            cost_per_call_usd: DEFAULT_COST_PER_CALL_USD,
            pacing: DEFAULT_PACING,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_articles == 0 {
            return Err(Error::Config("max_articles must be at least 1".to_string()));
        }
        if !self.budget_usd.is_finite() || self.budget_usd < 0.0 {
            return Err(Error::Config(format!(
                "budget must be a non-negative amount, got {}",
                self.budget_usd
            )));
        }
        if !self.cost_per_call_usd.is_finite() || self.cost_per_call_usd <= 0.0 {
            return Err(Error::Config(format!(
                "cost per call must be a positive amount, got {}",
                self.cost_per_call_usd
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_budget_is_allowed() {
        let config = RunConfig {
            budget_usd: 0.0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad = [
            RunConfig { max_articles: 0, ..RunConfig::default() },
            RunConfig { budget_usd: -1.0, ..RunConfig::default() },
            RunConfig { budget_usd: f64::INFINITY, ..RunConfig::default() },
            RunConfig { cost_per_call_usd: 0.0, ..RunConfig::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{:?}", config);
        }
    }
}
