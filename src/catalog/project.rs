//! Project exports: where the list of declared group addresses comes from.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use knxbridge_types::RawAddress;
use serde::Deserialize;
use tracing::info;

use crate::error::BridgeError;

/// Source of the declared group addresses.
///
/// Implementations read a project export once at startup. An unreadable or
/// empty export is an error: the bridge has nothing to monitor.
pub trait ProjectSource: Debug {
    /// Load all declared `(address, datatype, name)` rows.
    fn load(&self) -> Result<Vec<RawAddress>, BridgeError>;
}

/// A JSON project export.
///
/// Either a bare array of rows or an object with a `group_addresses` array:
///
/// ```json
/// {"group_addresses": [
///     {"address": "1/0/7", "dtype": "DPST-9-1", "name": "Temp1"},
///     {"address": "1/0/8", "dtype": null, "name": "Untyped"}
/// ]}
/// ```
#[derive(Debug, Clone)]
pub struct ProjectFile {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportDocument {
    Rows(Vec<RawAddress>),
    Project { group_addresses: Vec<RawAddress> },
}

impl ProjectFile {
    /// Create a source for the export at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the export path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectSource for ProjectFile {
    fn load(&self) -> Result<Vec<RawAddress>, BridgeError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| BridgeError::Project {
            path: self.path.clone(),
            source,
        })?;

        let document: ExportDocument =
            serde_json::from_str(&content).map_err(|source| BridgeError::ProjectFormat {
                path: self.path.clone(),
                source,
            })?;

        let rows = match document {
            ExportDocument::Rows(rows) => rows,
            ExportDocument::Project { group_addresses } => group_addresses,
        };

        if rows.is_empty() {
            return Err(BridgeError::EmptyProject(self.path.clone()));
        }

        info!("Loaded {} group addresses from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}
