//! Shared configuration types for fanin pipelines.

mod base;
mod batch;
mod delay;
mod destination;
mod pipeline;
mod runner;

pub use base::ValidationError;
pub use batch::BatchConfig;
pub use delay::DelayConfig;
pub use destination::DestinationConfig;
pub use pipeline::PipelineConfig;
pub use runner::RunnerConfig;
