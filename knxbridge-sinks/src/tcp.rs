//! TCP sink.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{encode_lines, MetricRecord, MetricSink, SinkError};

/// Streams records as JSON lines over one long-lived TCP connection.
///
/// The connection is opened on the first write and reused. A failed or
/// timed-out write drops it; the next write reconnects.
#[derive(Debug)]
pub struct TcpSink {
    address: String,
    description: String,
    connect_timeout: Duration,
    write_timeout: Duration,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpSink {
    /// Create a sink for `host:port` with 5 second timeouts.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            description: format!("tcp: {}", address),
            address,
            connect_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            stream: Mutex::new(None),
        }
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Set the per-batch write timeout.
    pub fn write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Returns the remote address.
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn connect(&self) -> Result<TcpStream, SinkError> {
        let stream = timeout(self.connect_timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| SinkError::Timeout)?
            .map_err(|e| SinkError::Connection(format!("{}: {}", self.address, e)))?;
        stream.set_nodelay(true)?;
        debug!("Connected to metrics collector at {}", self.address);
        Ok(stream)
    }
}

#[async_trait]
impl MetricSink for TcpSink {
    async fn write(&self, records: &[MetricRecord]) -> Result<(), SinkError> {
        let payload = encode_lines(records)?;

        let mut guard = self.stream.lock().await;
        let mut stream = match guard.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };

        match timeout(self.write_timeout, stream.write_all(&payload)).await {
            Ok(Ok(())) => {
                *guard = Some(stream);
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("Dropping connection to {} after write error: {}", self.address, e);
                Err(SinkError::Io(e))
            }
            Err(_) => {
                warn!("Dropping connection to {} after write timeout", self.address);
                Err(SinkError::Timeout)
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    fn record(name: &str) -> MetricRecord {
        MetricRecord::builder()
            .group_address_name(name)
            .unit("%")
            .value(40i64)
            .build()
    }

    #[tokio::test]
    async fn reuses_one_connection_for_many_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let sink = TcpSink::new(&addr);

        sink.write(&[record("a")]).await.unwrap();
        sink.write(&[record("b")]).await.unwrap();

        let (socket, _) = listener.accept().await.unwrap();
        let mut lines = BufReader::new(socket).lines();
        let first: MetricRecord = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        let second: MetricRecord = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(first.tag("GroupAddressName"), Some("a"));
        assert_eq!(second.tag("GroupAddressName"), Some("b"));

        // no second connection was opened
        let again = timeout(Duration::from_millis(100), listener.accept()).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn reconnects_after_the_collector_drops_the_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let sink = TcpSink::new(&addr);

        sink.write(&[record("a")]).await.unwrap();
        let (first, _) = listener.accept().await.unwrap();
        drop(first);

        // the kernel may buffer a write or two before the reset is seen
        let mut failed = false;
        for _ in 0..50 {
            if sink.write(&[record("lost")]).await.is_err() {
                failed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(failed, "write on a closed connection never failed");

        sink.write(&[record("b")]).await.unwrap();
        let (second, _) = timeout(Duration::from_secs(1), listener.accept())
            .await
            .expect("no reconnection")
            .unwrap();
        let mut lines = BufReader::new(second).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        let record: MetricRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(record.tag("GroupAddressName"), Some("b"));
    }

    #[tokio::test]
    async fn refused_connection_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let sink = TcpSink::new(&addr).connect_timeout(Duration::from_secs(1));
        let err = sink.write(&[record("a")]).await.unwrap_err();
        assert!(matches!(err, SinkError::Connection(_) | SinkError::Timeout));
        assert!(err.is_transient());
    }

    #[test]
    fn builder_sets_timeouts() {
        let sink = TcpSink::new("localhost:8094")
            .connect_timeout(Duration::from_millis(250))
            .write_timeout(Duration::from_millis(750));
        assert_eq!(sink.connect_timeout, Duration::from_millis(250));
        assert_eq!(sink.write_timeout, Duration::from_millis(750));
        assert_eq!(sink.description(), "tcp: localhost:8094");
    }
}
