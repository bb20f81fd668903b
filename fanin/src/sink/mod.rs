//! Single-writer ownership of the shared output resource.
//!
//! All result records produced by the worker pool converge here. A single
//! dedicated task owns the output resource for the whole run, which is what
//! guarantees that no two records can ever interleave within one line.

pub mod base;
pub mod file;
pub mod memory;
pub mod writer;

pub use base::OutputResource;
pub use writer::{ResultSink, ResultSinkHandle, SinkReport};
