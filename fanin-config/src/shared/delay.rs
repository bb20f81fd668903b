use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Bounds for the simulated per-item processing delay.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DelayConfig {
    /// Minimum delay in milliseconds.
    #[serde(default = "default_min_ms")]
    pub min_ms: u64,
    /// Maximum delay in milliseconds, inclusive.
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl DelayConfig {
    /// Default minimum delay in milliseconds.
    pub const DEFAULT_MIN_MS: u64 = 150;

    /// Default maximum delay in milliseconds.
    pub const DEFAULT_MAX_MS: u64 = 450;

    /// Validates the delay bounds.
    ///
    /// Ensures the range is not inverted. A degenerate range (`min_ms ==
    /// max_ms`, including zero) is allowed, tests rely on it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_ms > self.max_ms {
            return Err(ValidationError::InvalidDelayRange {
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }

        Ok(())
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_ms: default_min_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_min_ms() -> u64 {
    DelayConfig::DEFAULT_MIN_MS
}

fn default_max_ms() -> u64 {
    DelayConfig::DEFAULT_MAX_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_delay_range_fails_validation() {
        let config = DelayConfig {
            min_ms: 500,
            max_ms: 100,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn degenerate_delay_range_is_valid() {
        let config = DelayConfig {
            min_ms: 0,
            max_ms: 0,
        };
        assert!(config.validate().is_ok());
    }
}
