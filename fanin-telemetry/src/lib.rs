//! Telemetry bootstrap for fanin services.

pub mod tracing;
