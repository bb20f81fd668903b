//! Hierarchical configuration loading for fanin services.
//!
//! Configuration is assembled from a `configuration/` directory (a base file
//! plus one file per runtime environment) and `APP_`-prefixed environment
//! variable overrides.

pub mod environment;
mod load;
pub mod shared;

pub use load::{Config, LoadConfigError, load_config};
