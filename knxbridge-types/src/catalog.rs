//! Declared group addresses, before and after datatype resolution.

use crate::{CanonicalDatatype, ValueKind};

/// One row of a project export: a group address, its declared datatype and name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawAddress {
    /// Group address in 3-level notation, e.g. `1/0/7`.
    pub address: String,

    /// Datatype as declared in the project, e.g. `DPST-9-1`.
    ///
    /// `None` when the project declares no datatype or an unreadable one.
    #[cfg_attr(feature = "serde", serde(default, alias = "dtype"))]
    pub raw_datatype: Option<String>,

    /// Human readable name of the group address.
    pub name: String,
}

impl RawAddress {
    /// Create a raw address row.
    pub fn new(
        address: impl Into<String>,
        raw_datatype: Option<&str>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            raw_datatype: raw_datatype.map(str::to_string),
            name: name.into(),
        }
    }
}

/// A declared group address together with the outcome of its resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    /// Group address.
    pub address: String,

    /// Group address name.
    pub name: String,

    /// Datatype exactly as declared.
    pub raw_datatype: Option<String>,

    /// Normalized datatype; `None` only when no datatype was declared.
    pub canonical_datatype: Option<CanonicalDatatype>,

    /// Value kind to register with the bus; `None` when resolution failed.
    pub value_kind: Option<ValueKind>,
}

impl CatalogEntry {
    /// Whether the entry resolved to a value kind and can be monitored.
    pub fn is_resolved(&self) -> bool {
        self.value_kind.is_some()
    }
}
