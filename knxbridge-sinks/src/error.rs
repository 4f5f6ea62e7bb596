//! Error types for sinks.

use thiserror::Error;

/// Errors that can occur when writing metric records to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the underlying file or socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Connecting to the sink failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the sink.
    #[error("Sink timed out")]
    Timeout,

    /// The receiving side of the sink is gone.
    #[error("Sink closed")]
    Closed,

    /// The sink configuration is incomplete.
    #[error("Invalid sink configuration: {0}")]
    Config(String),
}

impl SinkError {
    /// Whether a later write may succeed without reconfiguration.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SinkError::Io(_) | SinkError::Connection(_) | SinkError::Timeout
        )
    }
}
