//! Datatype identifiers: canonical DPT strings, decoder names and value kinds.

use std::fmt;

/// A normalized datapoint type identifier such as `"DPT 9.001"`.
///
/// The numeric form is always `DPT <major>.<minor>` with the minor number
/// zero-padded to three digits. Identifiers that are not numeric are kept
/// verbatim, so equality is plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CanonicalDatatype(String);

impl CanonicalDatatype {
    /// Build the canonical form from numeric parts.
    pub fn from_parts(major: u64, minor: u64) -> Self {
        Self(format!("DPT {}.{:03}", major, minor))
    }

    /// Canonical form from decimal digit runs of any length.
    fn from_digits(major: &str, minor: &str) -> Self {
        Self(format!("DPT {}.{:0>3}", strip_zeros(major), strip_zeros(minor)))
    }

    /// Normalize a raw project datatype such as `"DPST-9-1"` or `"DPT-5"`.
    ///
    /// The raw identifier must split on `-` into a prefix followed by exactly
    /// two unsigned decimal numbers; anything else is returned unchanged.
    ///
    /// ```rust
    /// use knxbridge_types::CanonicalDatatype;
    ///
    /// assert_eq!(CanonicalDatatype::normalize("1-9-1").as_str(), "DPT 9.001");
    /// assert_eq!(CanonicalDatatype::normalize("DPT-1").as_str(), "DPT-1");
    /// ```
    pub fn normalize(raw: &str) -> Self {
        match split_raw(raw) {
            Some((major, minor)) => Self::from_digits(major, minor),
            None => Self(raw.to_string()),
        }
    }

    /// Parse a string that is already in `DPT <major>.<minor>` shape.
    ///
    /// The minor number is re-padded, so `"DPT 9.1"` parses to `"DPT 9.001"`.
    /// Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.trim().strip_prefix("DPT ")?;
        let (major, minor) = rest.split_once('.')?;
        if !is_digits(major) || !is_digits(minor) {
            return None;
        }
        Some(Self::from_digits(major, minor))
    }

    /// The canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn split_raw(raw: &str) -> Option<(&str, &str)> {
    let mut parts = raw.split('-');
    parts.next()?;
    let major = parts.next().filter(|p| is_digits(p))?;
    let minor = parts.next().filter(|p| is_digits(p))?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn strip_zeros(digits: &str) -> &str {
    match digits.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    }
}

impl fmt::Display for CanonicalDatatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of one of the bus stack's built-in decoders, e.g. `DPTTemperature`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InternalTypeName(String);

impl InternalTypeName {
    /// Create a decoder name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The decoder name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier the bus accepts when registering a monitored endpoint,
/// e.g. `temperature` or `percent`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ValueKind(String);

impl ValueKind {
    /// Create a value kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The value kind identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
