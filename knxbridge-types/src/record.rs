//! Metric records handed to storage sinks.

use std::collections::BTreeMap;

use crate::Value;

/// Measurement name every record of this bridge is written under.
pub const MEASUREMENT: &str = "knx";

/// Tag holding the group address name of the endpoint that changed.
pub const TAG_GROUP_ADDRESS_NAME: &str = "GroupAddressName";

/// Tag holding the unit of measurement reported by the bus.
pub const TAG_UNIT: &str = "Unit";

/// Tag holding the runtime type name of the value.
pub const TAG_DATA_TYPE: &str = "DataType";

/// Prefix of the single field key; the value's type name is appended.
pub const FIELD_PREFIX: &str = "SensorValue_";

/// One time-series point: a measurement with string tags and typed fields.
///
/// # Example
///
/// ```rust
/// use knxbridge_types::{MetricRecord, Value};
///
/// let record = MetricRecord::builder()
///     .group_address_name("Living room")
///     .unit("%")
///     .value(Value::Integer(40))
///     .build();
///
/// assert_eq!(record.tags["DataType"], "int");
/// assert!(record.fields.contains_key("SensorValue_int"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricRecord {
    /// Measurement (series namespace).
    pub measurement: String,

    /// Indexed string tags.
    pub tags: BTreeMap<String, String>,

    /// Field values keyed by field name.
    pub fields: BTreeMap<String, Value>,
}

impl MetricRecord {
    /// Create a builder for a record in the bridge's measurement.
    pub fn builder() -> MetricRecordBuilder {
        MetricRecordBuilder::new()
    }

    /// Field key used for a value: `SensorValue_<type name>`.
    pub fn field_key(value: &Value) -> String {
        format!("{}{}", FIELD_PREFIX, value.type_name())
    }

    /// Look up a tag.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Builder for `MetricRecord`.
#[derive(Debug, Default)]
pub struct MetricRecordBuilder {
    group_address_name: String,
    unit: String,
    value: Option<Value>,
}

impl MetricRecordBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint (group address) name.
    pub fn group_address_name(mut self, name: impl Into<String>) -> Self {
        self.group_address_name = name.into();
        self
    }

    /// Set the unit of measurement.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Build the record. Without a value the record carries no field.
    pub fn build(self) -> MetricRecord {
        let mut tags = BTreeMap::new();
        tags.insert(TAG_GROUP_ADDRESS_NAME.to_string(), self.group_address_name);
        tags.insert(TAG_UNIT.to_string(), self.unit);

        let mut fields = BTreeMap::new();
        if let Some(value) = self.value {
            tags.insert(TAG_DATA_TYPE.to_string(), value.type_name().to_string());
            fields.insert(MetricRecord::field_key(&value), value);
        }

        MetricRecord {
            measurement: MEASUREMENT.to_string(),
            tags,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_record_layout() {
        let record = MetricRecord::builder()
            .group_address_name("Temp1")
            .unit("°C")
            .value(21.5)
            .build();

        assert_eq!(record.measurement, "knx");
        assert_eq!(record.tags.len(), 3);
        assert_eq!(record.tag("GroupAddressName"), Some("Temp1"));
        assert_eq!(record.tag("Unit"), Some("°C"));
        assert_eq!(record.tag("DataType"), Some("float"));
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields["SensorValue_float"], Value::Float(21.5));
    }

    #[test]
    fn field_key_follows_value_type() {
        assert_eq!(MetricRecord::field_key(&Value::Boolean(false)), "SensorValue_bool");
        assert_eq!(MetricRecord::field_key(&Value::from("Auto")), "SensorValue_str");
    }

    #[test]
    fn empty_unit_is_still_tagged() {
        let record = MetricRecord::builder()
            .group_address_name("Scene")
            .value(3i64)
            .build();
        assert_eq!(record.tag("Unit"), Some(""));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_point_object() {
        let record = MetricRecord::builder()
            .group_address_name("Temp1")
            .unit("°C")
            .value(21.5)
            .build();

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "measurement": "knx",
                "tags": {"GroupAddressName": "Temp1", "Unit": "°C", "DataType": "float"},
                "fields": {"SensorValue_float": 21.5}
            })
        );
    }
}
