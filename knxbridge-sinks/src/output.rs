//! Built-in sink destinations.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{FileSink, MetricRecord, MetricSink, SinkConfig, SinkError, SinkKind, TcpSink};

/// Output destination for metric records.
///
/// Pick one with the constructors, or build one from a [`SinkConfig`].
#[derive(Debug)]
pub enum Output {
    /// Append records as JSON lines to a file.
    File(FileSink),

    /// Send records as newline-delimited JSON to a TCP server.
    Tcp(TcpSink),

    /// Send records through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<MetricRecord>),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use knxbridge_sinks::Output;
    ///
    /// let output = Output::file("knx_metrics.jsonl");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(FileSink::new(path))
    }

    /// Create a TCP output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use knxbridge_sinks::Output;
    ///
    /// let output = Output::tcp("localhost:8094");
    /// ```
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(TcpSink::new(addr))
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// Writes wait for capacity, so a slow receiver slows the bridge down
    /// instead of losing records.
    ///
    /// # Example
    ///
    /// ```rust
    /// use knxbridge_sinks::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive records
    /// // while let Some(record) = rx.recv().await {
    /// //     println!("{:?}", record.tags);
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<MetricRecord>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Build the output described by `config`.
    pub fn from_config(config: &SinkConfig) -> Result<Self, SinkError> {
        match config.kind {
            SinkKind::File => Ok(Output::file(config.path.clone())),
            SinkKind::Tcp => {
                let address = config
                    .address
                    .clone()
                    .ok_or_else(|| SinkError::Config("tcp sink requires an address".into()))?;
                Ok(Output::Tcp(
                    TcpSink::new(address)
                        .connect_timeout(config.connect_timeout())
                        .write_timeout(config.write_timeout()),
                ))
            }
        }
    }
}

#[async_trait]
impl MetricSink for Output {
    async fn write(&self, records: &[MetricRecord]) -> Result<(), SinkError> {
        match self {
            Output::File(sink) => sink.write(records).await,
            Output::Tcp(sink) => sink.write(records).await,
            Output::Channel(tx) => {
                for record in records {
                    tx.send(record.clone()).await.map_err(|_| SinkError::Closed)?;
                }
                Ok(())
            }
        }
    }

    fn description(&self) -> &str {
        match self {
            Output::File(sink) => sink.description(),
            Output::Tcp(sink) => sink.description(),
            Output::Channel(_) => "channel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MetricRecord {
        MetricRecord::builder()
            .group_address_name("Temp1")
            .unit("°C")
            .value(21.5)
            .build()
    }

    #[tokio::test]
    async fn channel_output_delivers_records_in_order() {
        let (output, mut rx) = Output::channel(4);
        let second = MetricRecord::builder().group_address_name("Temp2").value(1.0).build();

        output.write(&[record(), second.clone()]).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), record());
        assert_eq!(rx.recv().await.unwrap(), second);
    }

    #[tokio::test]
    async fn channel_output_reports_dropped_receiver() {
        let (output, rx) = Output::channel(4);
        drop(rx);

        let err = output.write(&[record()]).await.unwrap_err();
        assert!(matches!(err, SinkError::Closed));
    }

    #[test]
    fn from_config_builds_file_output() {
        let output = Output::from_config(&SinkConfig::default()).unwrap();
        assert!(matches!(output, Output::File(_)));
        assert_eq!(output.description(), "file: knx_metrics.jsonl");
    }

    #[test]
    fn from_config_tcp_requires_address() {
        let config = SinkConfig {
            kind: SinkKind::Tcp,
            ..SinkConfig::default()
        };
        assert!(matches!(Output::from_config(&config), Err(SinkError::Config(_))));

        let config = SinkConfig {
            kind: SinkKind::Tcp,
            address: Some("127.0.0.1:8094".into()),
            ..SinkConfig::default()
        };
        let output = Output::from_config(&config).unwrap();
        assert_eq!(output.description(), "tcp: 127.0.0.1:8094");
    }
}
