//! # knxbridge-sinks
//!
//! Storage sinks for the KNX bridge.
//!
//! A sink receives batches of [`MetricRecord`]s and persists or forwards them.
//! The bridge only depends on the [`MetricSink`] trait; this crate provides
//! ready-made outputs that encode every record as one JSON line:
//!
//! - **File** - appends to a local file (one handle kept open)
//! - **TCP** - streams to a collector such as a Telegraf socket listener
//!   (one connection reused across writes, re-established lazily after a failure)
//! - **Channel** - hands records to another task in the same process
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use knxbridge_sinks::{MetricSink, Output};
//! use knxbridge_types::MetricRecord;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = Output::tcp("127.0.0.1:8094");
//!
//!     let record = MetricRecord::builder()
//!         .group_address_name("Temp1")
//!         .unit("°C")
//!         .value(21.5)
//!         .build();
//!
//!     sink.write(&[record]).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod file;
mod output;
mod tcp;

use async_trait::async_trait;

pub use config::{SinkConfig, SinkKind};
pub use error::SinkError;
pub use file::FileSink;
pub use output::Output;
pub use tcp::TcpSink;

pub use knxbridge_types::MetricRecord;

/// A destination for metric records.
///
/// Implementations own their connection handling and timeouts. Errors are
/// returned to the caller as-is; a sink does not retry on its own.
#[async_trait]
pub trait MetricSink: Send + Sync + std::fmt::Debug {
    /// Write a batch of records.
    async fn write(&self, records: &[MetricRecord]) -> Result<(), SinkError>;

    /// Human-readable description of the destination, used in logs.
    fn description(&self) -> &str;
}

#[async_trait]
impl<S: MetricSink + ?Sized> MetricSink for std::sync::Arc<S> {
    async fn write(&self, records: &[MetricRecord]) -> Result<(), SinkError> {
        (**self).write(records).await
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}

/// Encode records as newline-delimited JSON.
pub(crate) fn encode_lines(records: &[MetricRecord]) -> Result<Vec<u8>, SinkError> {
    let mut buf = Vec::with_capacity(records.len() * 128);
    for record in records {
        serde_json::to_writer(&mut buf, record)?;
        buf.push(b'\n');
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_lines_writes_one_line_per_record() {
        let records = vec![
            MetricRecord::builder().group_address_name("a").value(1i64).build(),
            MetricRecord::builder().group_address_name("b").value(true).build(),
        ];

        let bytes = encode_lines(&records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        let second: MetricRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.tag("GroupAddressName"), Some("b"));
    }

    #[test]
    fn encode_empty_batch_is_empty() {
        assert!(encode_lines(&[]).unwrap().is_empty());
    }
}
