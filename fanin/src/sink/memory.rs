use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bail;
use crate::error::{ErrorKind, FaninResult};
use crate::sink::base::OutputResource;

#[derive(Debug, Default)]
struct Inner {
    lines: Vec<String>,
    flushed: bool,
    closed: bool,
}

/// In-memory output resource for testing and development purposes.
///
/// [`MemoryOutput`] stores all written lines in memory behind a shared handle,
/// so a test can keep a clone and inspect the captured output after the run.
/// It also carries fault knobs to exercise the sink's failure paths: an output
/// that refuses to open, and one whose writes fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    inner: Arc<Mutex<Inner>>,
    fail_open: bool,
    fail_writes: bool,
}

impl MemoryOutput {
    /// Creates a new empty memory output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory output whose [`OutputResource::open`] always fails.
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Creates a memory output whose writes always fail after a successful open.
    pub fn with_failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Returns a copy of all lines written so far.
    pub async fn lines(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.lines.clone()
    }

    /// Returns whether the output has been flushed and closed.
    pub async fn closed(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.flushed && inner.closed
    }
}

impl OutputResource for MemoryOutput {
    fn name() -> &'static str {
        "memory"
    }

    async fn open(&mut self) -> FaninResult<()> {
        if self.fail_open {
            bail!(
                ErrorKind::ResourceUnavailable,
                "Memory output is configured to be unavailable"
            );
        }

        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> FaninResult<()> {
        if self.fail_writes {
            bail!(
                ErrorKind::WriteFailed,
                "Memory output is configured to fail writes"
            );
        }

        let mut inner = self.inner.lock().await;
        inner.lines.push(line.to_string());

        Ok(())
    }

    async fn flush(&mut self) -> FaninResult<()> {
        let mut inner = self.inner.lock().await;
        inner.flushed = true;

        Ok(())
    }

    async fn close(&mut self) -> FaninResult<()> {
        let mut inner = self.inner.lock().await;
        inner.closed = true;

        Ok(())
    }
}
