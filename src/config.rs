//! Bridge configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `KNXBRIDGE` (nested keys separated by
//! `__`, e.g. `KNXBRIDGE__SINK__KIND=tcp`).
//!
//! ```toml
//! project_file = "ets_export.json"
//!
//! [bus]
//! connect = "127.0.0.1:3672"
//!
//! [sink]
//! kind = "tcp"
//! address = "127.0.0.1:8094"
//!
//! [dispatch]
//! workers = 4
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, Map};
use knxbridge_sinks::SinkConfig;
use serde::Deserialize;

use crate::error::BridgeError;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "KNXBRIDGE";

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Project export listing the group addresses.
    pub project_file: PathBuf,
    /// Decoder table replacing the built-in one.
    pub datatype_table: Option<PathBuf>,
    pub bus: BusConfig,
    pub sink: SinkConfig,
    pub dispatch: DispatchConfig,
    pub log: LogConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            project_file: PathBuf::from("ets_export.json"),
            datatype_table: None,
            bus: BusConfig::default(),
            sink: SinkConfig::default(),
            dispatch: DispatchConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Where telegrams come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Telegram gateway address (`host:port`). Stdin when absent.
    pub connect: Option<String>,
    /// Capacity of the change event channel between bus and dispatcher.
    pub event_buffer: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            connect: None,
            event_buffer: 256,
        }
    }
}

/// Dispatch loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Concurrent sink writers.
    pub workers: usize,
    /// Capacity of each worker queue.
    pub queue_depth: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            queue_depth: 64,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit JSON log lines instead of plain text.
    pub json: bool,
}

impl BridgeConfig {
    /// Load configuration from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, BridgeError> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load), reading environment variables from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, BridgeError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true)
                .source(env),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
