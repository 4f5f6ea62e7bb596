//! # knxbridge-types
//!
//! Core types shared by the KNX bridge crates. This crate defines how a bus
//! datatype is named, how a declared group address is described once it has
//! been resolved, and what a metric record handed to a storage sink looks like.
//!
//! ## Features
//!
//! - `serde`: JSON (or any serde format) serialization of every type
//!
//! ## Example
//!
//! ```rust
//! use knxbridge_types::{CanonicalDatatype, MetricRecord, Value};
//!
//! let dpt = CanonicalDatatype::normalize("DPST-9-1");
//! assert_eq!(dpt.as_str(), "DPT 9.001");
//!
//! let record = MetricRecord::builder()
//!     .group_address_name("Temp1")
//!     .unit("°C")
//!     .value(21.5)
//!     .build();
//!
//! assert_eq!(record.measurement, "knx");
//! assert_eq!(record.fields.get("SensorValue_float"), Some(&Value::Float(21.5)));
//! ```

mod catalog;
mod datatype;
mod record;
mod value;

pub use catalog::*;
pub use datatype::*;
pub use record::*;
pub use value::*;
