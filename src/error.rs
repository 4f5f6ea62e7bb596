//! Error types for the bridge.

use std::path::PathBuf;

use knxbridge_sinks::SinkError;
use knxbridge_types::{CanonicalDatatype, InternalTypeName};

use crate::datatype::TableVersion;
use thiserror::Error;

/// Errors that stop the bridge from starting.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The project export could not be read.
    #[error("Failed to read project export {path}: {source}")]
    Project {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project export is not valid JSON of the expected shape.
    #[error("Failed to parse project export {path}: {source}")]
    ProjectFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The project export declares no group addresses.
    #[error("Project export {0} declares no group addresses")]
    EmptyProject(PathBuf),

    /// The decoder table could not be read.
    #[error("Failed to read decoder table {path}: {source}")]
    TableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The decoder table is not valid JSON of the expected shape.
    #[error("Failed to parse decoder table: {0}")]
    Table(#[from] serde_json::Error),

    /// The decoder table was written for another table layout.
    #[error("Decoder table version {0} is not supported")]
    IncompatibleTable(TableVersion),

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The sink could not be constructed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Why a declared datatype has no value kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No decoder documents this datatype.
    #[error("Couldn't resolve {0}: no decoder documents this datatype")]
    UnknownDatatype(CanonicalDatatype),

    /// A decoder documents the datatype but is not usable for monitoring.
    #[error("Couldn't resolve {datatype}: decoder {decoder} has no value kind")]
    NoValueKind {
        datatype: CanonicalDatatype,
        decoder: InternalTypeName,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_name_the_datatype() {
        let err = ResolutionError::UnknownDatatype(CanonicalDatatype::from_parts(232, 600));
        assert_eq!(
            err.to_string(),
            "Couldn't resolve DPT 232.600: no decoder documents this datatype"
        );

        let err = ResolutionError::NoValueKind {
            datatype: CanonicalDatatype::from_parts(1, 1),
            decoder: InternalTypeName::new("DPTSwitch"),
        };
        assert!(err.to_string().contains("DPTSwitch"));
    }

    #[test]
    fn empty_project_mentions_path() {
        let err = BridgeError::EmptyProject(PathBuf::from("ets_export.json"));
        assert_eq!(
            err.to_string(),
            "Project export ets_export.json declares no group addresses"
        );
    }
}
