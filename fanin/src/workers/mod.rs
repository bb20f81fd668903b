//! Processing workers and their pool.
//!
//! Workers pull items from the shared [`crate::queue::WorkQueue`], simulate a
//! bounded amount of processing, and hand one result record per item to the
//! [`crate::sink::ResultSink`]. The pool owns the spawned tasks and isolates
//! individual worker failures from their siblings.

pub mod delay;
pub mod pool;
pub mod process;
