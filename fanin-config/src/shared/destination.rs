use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for supported result destinations.
///
/// Specifies where the single-writer sink persists result lines. Each variant
/// corresponds to a different supported output resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationConfig {
    /// In-memory destination, useful for tests and dry runs.
    Memory,
    /// Line-oriented file destination.
    File {
        /// Path of the output file. Created or truncated on open.
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_destination_deserializes_with_snake_case_tag() {
        let config: DestinationConfig =
            serde_json::from_str(r#"{ "file": { "path": "results.log" } }"#).unwrap();

        match config {
            DestinationConfig::File { path } => assert_eq!(path, PathBuf::from("results.log")),
            other => panic!("unexpected destination: {other:?}"),
        }
    }
}
