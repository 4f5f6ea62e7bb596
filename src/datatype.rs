//! Datatype resolution tables.
//!
//! A [`DatatypeMap`] answers two questions for the catalog: which decoder of
//! the bus stack handles a canonical datatype (`forward`), and which value
//! kind the bus expects when an endpoint is registered with that decoder
//! (`reverse`). Both tables are built once from a versioned [`DecoderTable`]
//! and never change afterwards.
//!
//! The decoder table ships with the crate (`data/dpt_table.json`) and can be
//! replaced at startup with a file of the same layout.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use knxbridge_types::{CanonicalDatatype, InternalTypeName, ValueClass, ValueKind};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{BridgeError, ResolutionError};

const BUILTIN_TABLE: &str = include_str!("../data/dpt_table.json");

/// Table layout this build reads. A table stamped with another major number
/// is refused rather than half understood.
pub const SUPPORTED_TABLE_MAJOR: u32 = 1;

/// `major.minor` stamp of a decoder table.
///
/// The minor number grows when rows or optional columns are added, which
/// older readers ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TableVersion {
    pub major: u32,
    pub minor: u32,
}

impl TableVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for TableVersion {
    fn default() -> Self {
        Self::new(SUPPORTED_TABLE_MAJOR, 0)
    }
}

impl fmt::Display for TableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Decoder table as shipped on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecoderTable {
    /// Table layout version.
    pub version: TableVersion,

    /// Decoder rows, in priority order.
    pub decoders: Vec<DecoderRow>,
}

/// One decoder of the bus stack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecoderRow {
    /// Decoder name.
    pub name: InternalTypeName,

    /// Datatypes the decoder documents, in `DPT <major>.<minor>` form.
    #[serde(default)]
    pub datatypes: Vec<String>,

    /// Value kind used to register endpoints; absent for decoders that
    /// cannot back a monitored endpoint.
    #[serde(default)]
    pub value_kind: Option<ValueKind>,

    /// Representation of decoded values. Telegrams are coerced into it.
    #[serde(default)]
    pub value_class: Option<ValueClass>,

    /// Unit of measurement the bus reports for values of this decoder.
    #[serde(default)]
    pub unit: Option<String>,
}

impl DecoderTable {
    /// The table embedded in this crate.
    pub fn builtin() -> Result<Self, BridgeError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Parse a table and check its version.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        let table: DecoderTable = serde_json::from_str(json)?;
        if table.version.major != SUPPORTED_TABLE_MAJOR {
            return Err(BridgeError::IncompatibleTable(table.version));
        }
        Ok(table)
    }

    /// Read a table from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BridgeError::TableIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Forward and reverse datatype lookup tables.
///
/// # Example
///
/// ```rust
/// use knx_bridge::DatatypeMap;
/// use knxbridge_types::CanonicalDatatype;
///
/// let map = DatatypeMap::builtin().unwrap();
/// let kind = map.resolve(&CanonicalDatatype::normalize("DPST-9-1")).unwrap();
///
/// assert_eq!(kind.as_str(), "temperature");
/// assert_eq!(map.unit(&kind), Some("°C"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatatypeMap {
    version: TableVersion,
    forward: BTreeMap<CanonicalDatatype, InternalTypeName>,
    reverse: BTreeMap<InternalTypeName, ValueKind>,
    units: BTreeMap<ValueKind, String>,
    classes: BTreeMap<ValueKind, ValueClass>,
}

impl DatatypeMap {
    /// Build the lookup tables from a decoder table.
    ///
    /// A datatype documented by several decoders belongs to the first one.
    /// Rows that document no usable datatype are skipped with a warning;
    /// their value kind is still recorded.
    pub fn build(table: &DecoderTable) -> Self {
        let mut forward = BTreeMap::new();
        let mut reverse = BTreeMap::new();
        let mut units = BTreeMap::new();
        let mut classes = BTreeMap::new();

        for row in &table.decoders {
            let mut documented = 0;

            for raw in &row.datatypes {
                let Some(datatype) = CanonicalDatatype::parse(raw) else {
                    warn!("Ignoring malformed datatype {:?} of decoder {}", raw, row.name);
                    continue;
                };
                documented += 1;

                match forward.entry(datatype) {
                    Entry::Vacant(slot) => {
                        slot.insert(row.name.clone());
                    }
                    Entry::Occupied(slot) => {
                        debug!(
                            "{} is already handled by {}, ignoring {}",
                            slot.key(),
                            slot.get(),
                            row.name
                        );
                    }
                }
            }

            if documented == 0 {
                warn!("Could not extract a datatype for decoder {}", row.name);
            }

            if let Some(kind) = &row.value_kind {
                reverse.insert(row.name.clone(), kind.clone());
                if let Some(unit) = &row.unit {
                    units.insert(kind.clone(), unit.clone());
                }
                if let Some(class) = row.value_class {
                    classes.insert(kind.clone(), class);
                }
            }
        }

        Self {
            version: table.version,
            forward,
            reverse,
            units,
            classes,
        }
    }

    /// Build from the table embedded in this crate.
    pub fn builtin() -> Result<Self, BridgeError> {
        Ok(Self::build(&DecoderTable::builtin()?))
    }

    /// Build from a table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        Ok(Self::build(&DecoderTable::load(path)?))
    }

    /// Version of the table the map was built from.
    pub fn version(&self) -> TableVersion {
        self.version
    }

    /// Canonical datatype to decoder name.
    pub fn forward(&self) -> &BTreeMap<CanonicalDatatype, InternalTypeName> {
        &self.forward
    }

    /// Decoder name to value kind.
    pub fn reverse(&self) -> &BTreeMap<InternalTypeName, ValueKind> {
        &self.reverse
    }

    /// Decoder handling a datatype.
    pub fn internal_name(&self, datatype: &CanonicalDatatype) -> Option<&InternalTypeName> {
        self.forward.get(datatype)
    }

    /// Value kind of a decoder.
    pub fn value_kind(&self, decoder: &InternalTypeName) -> Option<&ValueKind> {
        self.reverse.get(decoder)
    }

    /// Resolve a datatype to the value kind to register it with.
    pub fn resolve(&self, datatype: &CanonicalDatatype) -> Result<ValueKind, ResolutionError> {
        let decoder = self
            .internal_name(datatype)
            .ok_or_else(|| ResolutionError::UnknownDatatype(datatype.clone()))?;

        self.value_kind(decoder)
            .cloned()
            .ok_or_else(|| ResolutionError::NoValueKind {
                datatype: datatype.clone(),
                decoder: decoder.clone(),
            })
    }

    /// Unit of measurement for a value kind, if the table names one.
    pub fn unit(&self, kind: &ValueKind) -> Option<&str> {
        self.units.get(kind).map(String::as_str)
    }

    /// All known units keyed by value kind.
    pub fn units(&self) -> &BTreeMap<ValueKind, String> {
        &self.units
    }

    /// Representation of values of a kind, if the table names one.
    pub fn value_class(&self, kind: &ValueKind) -> Option<ValueClass> {
        self.classes.get(kind).copied()
    }

    /// All known value classes keyed by value kind.
    pub fn classes(&self) -> &BTreeMap<ValueKind, ValueClass> {
        &self.classes
    }
}
