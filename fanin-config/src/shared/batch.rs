use serde::{Deserialize, Serialize};

/// Batch loading configuration for pipelines.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    /// Number of work items loaded into the queue at startup.
    #[serde(default = "default_batch_items")]
    pub items: u64,
    /// Prefix used to generate each item's payload (`{prefix}-{n}`).
    #[serde(default = "default_payload_prefix")]
    pub payload_prefix: String,
}

impl BatchConfig {
    /// Default number of items in a batch.
    pub const DEFAULT_ITEMS: u64 = 20;

    /// Default payload prefix.
    pub const DEFAULT_PAYLOAD_PREFIX: &'static str = "data";
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            items: default_batch_items(),
            payload_prefix: default_payload_prefix(),
        }
    }
}

fn default_batch_items() -> u64 {
    BatchConfig::DEFAULT_ITEMS
}

fn default_payload_prefix() -> String {
    BatchConfig::DEFAULT_PAYLOAD_PREFIX.to_string()
}
