use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::{BatchConfig, DelayConfig, ValidationError};

/// Configuration for a fanin pipeline.
///
/// Contains all settings required to run one batch: the batch to load, the
/// size of the worker pool, the simulated delay bounds, and the optional
/// bounded wait on shutdown.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// The unique identifier for this pipeline.
    pub id: u64,
    /// Number of processing workers spawned for the run.
    #[serde(default = "default_workers")]
    pub workers: u16,
    /// Batch loading configuration.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Simulated per-item processing delay bounds.
    #[serde(default)]
    pub delay: DelayConfig,
    /// Maximum time, in milliseconds, to wait for workers before broadcasting
    /// the shutdown signal. `None` waits indefinitely.
    #[serde(default)]
    pub shutdown_timeout_ms: Option<u64>,
}

impl PipelineConfig {
    /// Default number of processing workers.
    pub const DEFAULT_WORKERS: u16 = 4;

    /// Validates pipeline configuration settings.
    ///
    /// Ensures the worker count is non-zero and the delay range is well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::WorkersZero);
        }

        self.delay.validate()?;

        Ok(())
    }

    /// Returns the bounded shutdown wait, if one is configured.
    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_ms.map(Duration::from_millis)
    }
}

fn default_workers() -> u16 {
    PipelineConfig::DEFAULT_WORKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PipelineConfig {
        PipelineConfig {
            id: 1,
            workers: 4,
            batch: BatchConfig::default(),
            delay: DelayConfig::default(),
            shutdown_timeout_ms: None,
        }
    }

    #[test]
    fn zero_workers_fails_validation() {
        let mut config = valid_config();
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_deserialize_from_a_minimal_document() {
        let config: PipelineConfig = serde_json::from_str(r#"{ "id": 7 }"#).unwrap();

        assert_eq!(config.workers, PipelineConfig::DEFAULT_WORKERS);
        assert_eq!(config.batch.items, BatchConfig::DEFAULT_ITEMS);
        assert_eq!(config.batch.payload_prefix, "data");
        assert_eq!(config.delay.min_ms, DelayConfig::DEFAULT_MIN_MS);
        assert_eq!(config.delay.max_ms, DelayConfig::DEFAULT_MAX_MS);
        assert_eq!(config.shutdown_timeout(), None);
        assert!(config.validate().is_ok());
    }
}
