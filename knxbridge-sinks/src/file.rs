//! File sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{encode_lines, MetricRecord, MetricSink, SinkError};

/// Appends records as JSON lines to a file.
///
/// The file is opened on the first write and kept open. After a failed write
/// the handle is dropped and reopened by the next write.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    description: String,
    file: Mutex<Option<File>>,
}

impl FileSink {
    /// Create a sink appending to `path`. The file is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            file: Mutex::new(None),
        }
    }

    /// Returns the output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<File, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        debug!("Opened metrics file {}", self.path.display());
        Ok(file)
    }
}

#[async_trait]
impl MetricSink for FileSink {
    async fn write(&self, records: &[MetricRecord]) -> Result<(), SinkError> {
        let payload = encode_lines(records)?;

        let mut guard = self.file.lock().await;
        let mut file = match guard.take() {
            Some(file) => file,
            None => self.open().await?,
        };

        file.write_all(&payload).await?;
        file.flush().await?;
        *guard = Some(file);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
