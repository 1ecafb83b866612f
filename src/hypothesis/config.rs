// Configuration for hypothesis testing

use serde::{Deserialize, Serialize};

/// Configuration for the strategy comparisons
///
/// # Example
/// ```
/// use greenci::hypothesis::HypothesisConfig;
///
/// let config = HypothesisConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.min_sample_size, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HypothesisConfig {
    /// Statistical significance level (alpha)
    ///
    /// The null hypothesis is rejected when p < alpha.
    pub significance_level: f64,

    /// Minimum number of samples per group before a test is run
    ///
    /// Below this the comparison reports insufficient data instead of an
    /// unreliable statistic.
    pub min_sample_size: usize,
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_sample_size: 3,
        }
    }
}

impl HypothesisConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if self.min_sample_size < 2 {
            return Err(format!(
                "min_sample_size must be >= 2 for a rank test, got {}",
                self.min_sample_size
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HypothesisConfig::default();
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.min_sample_size, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_significance_level() {
        let mut config = HypothesisConfig::default();
        config.significance_level = 1.5;
        assert!(config.validate().is_err());
        config.significance_level = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_min_sample_size() {
        let mut config = HypothesisConfig::default();
        config.min_sample_size = 1;
        assert!(config.validate().is_err());
    }
}
