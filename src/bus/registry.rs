//! Registered endpoints, keyed by group address.

use std::collections::BTreeMap;
use std::sync::Arc;

use knxbridge_types::{ValueClass, ValueKind};
use parking_lot::RwLock;
use tracing::warn;

use super::{ChangeEvent, Endpoint, Telegram};
use crate::datatype::DatatypeMap;

/// Registry handle shared between a bus client and its spawned task.
pub type SharedRegistry = Arc<RwLock<DeviceRegistry>>;

/// Endpoints registered with a bus client.
///
/// Several endpoints may share one group address; each of them receives its
/// own change event. Telegram values are decoded into the value class of the
/// endpoint's kind, so an endpoint always reports the same type.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    by_address: BTreeMap<String, Vec<Endpoint>>,
    units: BTreeMap<ValueKind, String>,
    classes: BTreeMap<ValueKind, ValueClass>,
}

impl DeviceRegistry {
    /// Create an empty registry without units.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unit of measure reported for each value kind.
    pub fn with_units(mut self, units: BTreeMap<ValueKind, String>) -> Self {
        self.units = units;
        self
    }

    /// Set the value class telegrams are coerced into for each value kind.
    /// Kinds without a class pass values through unchanged.
    pub fn with_classes(mut self, classes: BTreeMap<ValueKind, ValueClass>) -> Self {
        self.classes = classes;
        self
    }

    /// Set units and value classes from a datatype map.
    pub fn with_datatypes(self, map: &DatatypeMap) -> Self {
        self.with_units(map.units().clone())
            .with_classes(map.classes().clone())
    }

    /// Add an endpoint. No deduplication is performed.
    pub fn insert(&mut self, endpoint: Endpoint) {
        self.by_address
            .entry(endpoint.address.clone())
            .or_default()
            .push(endpoint);
    }

    /// Endpoints registered on an address.
    pub fn endpoints(&self, address: &str) -> &[Endpoint] {
        self.by_address
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over all registrations in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.by_address.values().flatten()
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.by_address.values().map(Vec::len).sum()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    /// Unit reported for a value kind.
    pub fn unit(&self, kind: &ValueKind) -> Option<&str> {
        self.units.get(kind).map(String::as_str)
    }

    /// Value class of a value kind.
    pub fn value_class(&self, kind: &ValueKind) -> Option<ValueClass> {
        self.classes.get(kind).copied()
    }

    /// Change events produced by a telegram, one per endpoint on its address.
    ///
    /// An endpoint whose value class cannot hold the telegram value is
    /// skipped with a warning.
    pub fn events_for(&self, telegram: &Telegram) -> Vec<ChangeEvent> {
        self.endpoints(&telegram.address)
            .iter()
            .filter_map(|endpoint| {
                let value = match self.value_class(&endpoint.value_kind) {
                    Some(class) => match class.coerce(telegram.value.clone()) {
                        Some(value) => value,
                        None => {
                            warn!(
                                "Dropping telegram for {} on {}: {} is not a {} value",
                                endpoint.name, telegram.address, telegram.value, class
                            );
                            return None;
                        }
                    },
                    None => telegram.value.clone(),
                };

                Some(ChangeEvent {
                    name: endpoint.name.clone(),
                    value,
                    unit: self.unit(&endpoint.value_kind).map(str::to_string),
                })
            })
            .collect()
    }

    /// Wrap the registry for sharing with a spawned task.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str, address: &str, kind: &str) -> Endpoint {
        Endpoint {
            name: name.into(),
            address: address.into(),
            value_kind: ValueKind::new(kind),
        }
    }

    fn units() -> BTreeMap<ValueKind, String> {
        [(ValueKind::new("temperature"), "°C".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn events_carry_name_value_and_unit() {
        let mut registry = DeviceRegistry::new().with_units(units());
        registry.insert(endpoint("Temp1", "1/0/7", "temperature"));

        let events = registry.events_for(&Telegram::new("1/0/7", 21.5));
        assert_eq!(events, vec![ChangeEvent::new("Temp1", 21.5, Some("°C"))]);
    }

    #[test]
    fn unknown_kind_has_no_unit() {
        let mut registry = DeviceRegistry::new().with_units(units());
        registry.insert(endpoint("Scene", "2/0/0", "scene_number"));

        let events = registry.events_for(&Telegram::new("2/0/0", 3i64));
        assert_eq!(events[0].unit, None);
    }

    #[test]
    fn shared_address_fans_out() {
        let mut registry = DeviceRegistry::new();
        registry.insert(endpoint("Temp1", "1/0/7", "temperature"));
        registry.insert(endpoint("Temp1", "1/0/7", "temperature"));
        registry.insert(endpoint("Other", "1/0/8", "temperature"));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.endpoints("1/0/7").len(), 2);
        assert_eq!(registry.events_for(&Telegram::new("1/0/7", 1.0)).len(), 2);
    }

    #[test]
    fn values_follow_the_class_of_the_kind() {
        let classes = [(ValueKind::new("temperature"), ValueClass::Float)].into();
        let mut registry = DeviceRegistry::new().with_classes(classes);
        registry.insert(endpoint("Temp1", "1/0/7", "temperature"));

        let keys: Vec<&str> = [Telegram::new("1/0/7", 21i64), Telegram::new("1/0/7", 21.5)]
            .iter()
            .flat_map(|t| registry.events_for(t))
            .map(|e| e.value.type_name())
            .collect();
        assert_eq!(keys, vec!["float", "float"]);
        assert_eq!(
            registry.events_for(&Telegram::new("1/0/7", 21i64))[0].value,
            knxbridge_types::Value::Float(21.0)
        );
    }

    #[test]
    fn mismatched_value_is_dropped() {
        let classes = [(ValueKind::new("temperature"), ValueClass::Float)].into();
        let mut registry = DeviceRegistry::new().with_classes(classes);
        registry.insert(endpoint("Temp1", "1/0/7", "temperature"));
        registry.insert(endpoint("Raw", "1/0/7", "unclassified"));

        let events = registry.events_for(&Telegram::new("1/0/7", "warm"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Raw");
    }

    #[test]
    fn builtin_map_supplies_units_and_classes() {
        let map = DatatypeMap::builtin().unwrap();
        let mut registry = DeviceRegistry::new().with_datatypes(&map);
        registry.insert(endpoint("Counter", "3/0/0", "active_energy_kwh"));

        let events = registry.events_for(&Telegram::new("3/0/0", 1200.0));
        assert_eq!(events, vec![ChangeEvent::new("Counter", 1200i64, Some("kWh"))]);
    }

    #[test]
    fn unregistered_address_produces_nothing() {
        let registry = DeviceRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.endpoints("9/9/9").is_empty());
        assert!(registry.events_for(&Telegram::new("9/9/9", true)).is_empty());
    }
}
