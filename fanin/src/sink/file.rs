use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{ErrorKind, FaninResult};
use crate::fanin_error;
use crate::sink::base::OutputResource;

/// File-backed output resource.
///
/// Writes buffered lines to a file created at open time. Buffered output means
/// durability is guaranteed at [`OutputResource::close`] (which flushes), not
/// per line.
#[derive(Debug)]
pub struct FileOutput {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileOutput {
    /// Creates a file output that will write to `path`.
    ///
    /// The file is not touched until [`OutputResource::open`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    fn writer(&mut self) -> FaninResult<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or_else(|| {
            fanin_error!(
                ErrorKind::InvalidState,
                "Output file is not open",
                format!("path: {}", self.path.display())
            )
        })
    }
}

impl OutputResource for FileOutput {
    fn name() -> &'static str {
        "file"
    }

    async fn open(&mut self) -> FaninResult<()> {
        let file = File::create(&self.path).await.map_err(|err| {
            fanin_error!(
                ErrorKind::ResourceUnavailable,
                "Failed to create output file",
                format!("path: {}", self.path.display()),
                source: err
            )
        })?;
        self.writer = Some(BufWriter::new(file));

        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> FaninResult<()> {
        let writer = self.writer()?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        Ok(())
    }

    async fn flush(&mut self) -> FaninResult<()> {
        self.writer()?.flush().await?;

        Ok(())
    }

    async fn close(&mut self) -> FaninResult<()> {
        // Taking the writer makes close idempotent-safe: a second call is a no-op.
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        writer.flush().await?;
        writer.shutdown().await?;

        Ok(())
    }
}
