//! Sink connection settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Which sink implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Append JSON lines to a file.
    #[default]
    File,
    /// Stream JSON lines over a TCP connection.
    Tcp,
}

/// Settings passed to a sink at construction.
///
/// ```toml
/// [sink]
/// kind = "tcp"
/// address = "127.0.0.1:8094"
/// connect_timeout_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Sink implementation.
    pub kind: SinkKind,

    /// Output file for the `file` sink.
    pub path: PathBuf,

    /// `host:port` for the `tcp` sink.
    pub address: Option<String>,

    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Per-batch write timeout in milliseconds.
    pub write_timeout_ms: u64,
}

impl SinkConfig {
    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Write timeout as a `Duration`.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::File,
            path: PathBuf::from("knx_metrics.jsonl"),
            address: None,
            connect_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_file_sink() {
        let config = SinkConfig::default();
        assert_eq!(config.kind, SinkKind::File);
        assert_eq!(config.path, PathBuf::from("knx_metrics.jsonl"));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: SinkConfig =
            serde_json::from_str(r#"{"kind": "tcp", "address": "10.0.0.5:8094"}"#).unwrap();
        assert_eq!(config.kind, SinkKind::Tcp);
        assert_eq!(config.address.as_deref(), Some("10.0.0.5:8094"));
        assert_eq!(config.write_timeout_ms, 5_000);
    }
}
