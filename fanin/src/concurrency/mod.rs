//! Concurrency primitives used to coordinate the pipeline.
//!
//! The pipeline coordinates a pool of processing workers and a single sink task
//! through a broadcast shutdown signal: one sender can terminate every worker,
//! workers observe the signal at their loop boundaries (and while suspended in
//! their simulated processing step), and resource cleanup happens in dependency
//! order so shutdown can never deadlock.

pub mod shutdown;
