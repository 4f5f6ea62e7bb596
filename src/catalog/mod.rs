//! Address catalog: every declared group address with its resolved value kind.
//!
//! Resolution never drops a row. Addresses whose datatype cannot be mapped
//! stay in the catalog without a value kind so that the startup summary
//! accounts for every declared address.

mod project;

pub use project::{ProjectFile, ProjectSource};

use std::collections::BTreeMap;

use knxbridge_types::{CanonicalDatatype, CatalogEntry, RawAddress};
use tracing::{debug, error, warn};

use crate::datatype::DatatypeMap;

/// Resolved catalog keyed by group address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl AddressCatalog {
    /// Resolve every raw address against the datatype map.
    ///
    /// Failures are logged per entry and never stop the pass. A repeated
    /// address replaces the earlier row.
    pub fn resolve(raw: impl IntoIterator<Item = RawAddress>, map: &DatatypeMap) -> Self {
        let mut entries = BTreeMap::new();

        for row in raw {
            let entry = resolve_entry(row, map);
            if let Some(previous) = entries.insert(entry.address.clone(), entry) {
                warn!(
                    "Group address {} is declared twice, replacing {:?}",
                    previous.address, previous.name
                );
            }
        }

        Self { entries }
    }

    /// Look up an entry by address.
    pub fn get(&self, address: &str) -> Option<&CatalogEntry> {
        self.entries.get(address)
    }

    /// Iterate over all entries in address order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries that resolved to a value kind.
    pub fn resolved(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.iter().filter(|e| e.is_resolved())
    }

    /// Entries without a value kind.
    pub fn unresolved(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.iter().filter(|e| !e.is_resolved())
    }

    /// Number of resolved entries.
    pub fn resolved_count(&self) -> usize {
        self.resolved().count()
    }

    /// Number of declared addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a AddressCatalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

fn resolve_entry(row: RawAddress, map: &DatatypeMap) -> CatalogEntry {
    let canonical = row.raw_datatype.as_deref().map(CanonicalDatatype::normalize);

    let value_kind = match &canonical {
        Some(datatype) => match map.resolve(datatype) {
            Ok(kind) => {
                debug!("{} ({}) resolved to {}", row.address, datatype, kind);
                Some(kind)
            }
            Err(e) => {
                error!("{} ({:?}): {}", row.address, row.name, e);
                None
            }
        },
        None => {
            debug!("{} ({:?}) declares no datatype", row.address, row.name);
            None
        }
    };

    CatalogEntry {
        address: row.address,
        name: row.name,
        raw_datatype: row.raw_datatype,
        canonical_datatype: canonical,
        value_kind,
    }
}
