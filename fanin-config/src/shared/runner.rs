use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{DestinationConfig, PipelineConfig, ValidationError};

/// Complete configuration for the runner service.
///
/// Aggregates everything required to run one batch: the pipeline settings and
/// the destination the sink writes to. Typically loaded from configuration
/// files at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    /// Configuration for the batch pipeline.
    pub pipeline: PipelineConfig,
    /// Configuration for the result destination.
    pub destination: DestinationConfig,
}

impl RunnerConfig {
    /// Validates the complete runner configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pipeline.validate()
    }
}

impl Config for RunnerConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_config_deserializes_from_yaml_shaped_json() {
        let config: RunnerConfig = serde_json::from_str(
            r#"{
                "pipeline": { "id": 1, "workers": 4 },
                "destination": { "file": { "path": "results.log" } }
            }"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.id, 1);
    }
}
