use std::future::Future;

use crate::error::FaninResult;

/// Trait for append-only output resources that persist result lines.
///
/// [`OutputResource`] implementations define where the serialized result lines
/// end up. The resource is exclusively owned by the sink's writer task for the
/// duration of a run; no other component ever touches it directly, so
/// implementations do not need to be concurrency-safe themselves.
///
/// Every operation may fail with an I/O-kind error. A failed
/// [`OutputResource::open`] downgrades the run to drain-and-discard mode rather
/// than blocking producers, so implementations should fail fast instead of
/// retrying internally.
pub trait OutputResource: Send + 'static {
    /// Returns the name of the output resource, used for logging.
    fn name() -> &'static str;

    /// Opens or acquires the underlying resource.
    ///
    /// Called exactly once, strictly before any line is written.
    fn open(&mut self) -> impl Future<Output = FaninResult<()>> + Send;

    /// Appends one already-formatted record line.
    ///
    /// The line is passed without its trailing newline; the implementation is
    /// responsible for terminating it so that each call produces exactly one
    /// whole line in the output.
    fn write_line(&mut self, line: &str) -> impl Future<Output = FaninResult<()>> + Send;

    /// Flushes any buffered lines to the underlying resource.
    fn flush(&mut self) -> impl Future<Output = FaninResult<()>> + Send;

    /// Flushes and releases the underlying resource.
    ///
    /// Called exactly once, strictly after the last write.
    fn close(&mut self) -> impl Future<Output = FaninResult<()>> + Send;
}
