//! Decoded values reported by the bus.

use std::fmt;

/// A decoded datapoint value.
///
/// The variant determines the runtime type name that ends up in the
/// `DataType` tag and the `SensorValue_<type>` field key of a metric record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// `true` / `false` datapoints.
    Boolean(bool),
    /// Counters, scene numbers and other integral datapoints.
    Integer(i64),
    /// Measurements.
    Float(f64),
    /// Text datapoints and enumerations reported by name.
    String(String),
}

impl Value {
    /// Runtime type name of the value: `bool`, `int`, `float` or `str`.
    ///
    /// These names are written into stored series keys and must stay stable.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// The representation a decoder produces for every telegram of a value kind.
///
/// A gateway reports JSON scalars, so a temperature of `21` arrives as an
/// integer. Coercing through the class keeps one series per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueClass {
    Bool,
    Int,
    Float,
    Str,
}

impl ValueClass {
    /// Convert `value` into this class.
    ///
    /// Integers widen to floats and integral floats narrow to integers.
    /// Returns `None` when the value cannot be represented.
    pub fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (ValueClass::Bool, v @ Value::Boolean(_)) => Some(v),
            (ValueClass::Int, v @ Value::Integer(_)) => Some(v),
            (ValueClass::Int, Value::Float(f)) if is_integral(f) => Some(Value::Integer(f as i64)),
            (ValueClass::Float, v @ Value::Float(_)) => Some(v),
            (ValueClass::Float, Value::Integer(i)) => Some(Value::Float(i as f64)),
            (ValueClass::Str, v @ Value::String(_)) => Some(v),
            _ => None,
        }
    }

    /// The `type_name` of values of this class.
    pub fn type_name(self) -> &'static str {
        match self {
            ValueClass::Bool => "bool",
            ValueClass::Int => "int",
            ValueClass::Float => "float",
            ValueClass::Str => "str",
        }
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(Value::from(true).type_name(), "bool");
        assert_eq!(Value::from(3i64).type_name(), "int");
        assert_eq!(Value::from(21.5).type_name(), "float");
        assert_eq!(Value::from("comfort").type_name(), "str");
    }

    #[test]
    fn as_f64_only_for_numbers() {
        assert_eq!(Value::Integer(4).as_f64(), Some(4.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Boolean(true).as_f64(), None);
        assert_eq!(Value::from("x").as_f64(), None);
    }

    #[test]
    fn float_class_widens_integers() {
        assert_eq!(ValueClass::Float.coerce(Value::Integer(21)), Some(Value::Float(21.0)));
        assert_eq!(ValueClass::Float.coerce(Value::Float(21.5)), Some(Value::Float(21.5)));
        assert_eq!(ValueClass::Float.coerce(Value::from("warm")), None);
        assert_eq!(ValueClass::Float.coerce(Value::Boolean(true)), None);
    }

    #[test]
    fn int_class_accepts_only_integral_numbers() {
        assert_eq!(ValueClass::Int.coerce(Value::Integer(7)), Some(Value::Integer(7)));
        assert_eq!(ValueClass::Int.coerce(Value::Float(3.0)), Some(Value::Integer(3)));
        assert_eq!(ValueClass::Int.coerce(Value::Float(3.5)), None);
        assert_eq!(ValueClass::Int.coerce(Value::Float(f64::NAN)), None);
    }

    #[test]
    fn bool_and_str_classes_are_strict() {
        assert_eq!(ValueClass::Bool.coerce(Value::Boolean(false)), Some(Value::Boolean(false)));
        assert_eq!(ValueClass::Bool.coerce(Value::Integer(1)), None);
        assert_eq!(ValueClass::Str.coerce(Value::from("Comfort")), Some(Value::from("Comfort")));
        assert_eq!(ValueClass::Str.coerce(Value::Integer(1)), None);
    }

    #[test]
    fn class_names_match_value_type_names() {
        for (class, value) in [
            (ValueClass::Bool, Value::Boolean(true)),
            (ValueClass::Int, Value::Integer(1)),
            (ValueClass::Float, Value::Float(1.5)),
            (ValueClass::Str, Value::from("x")),
        ] {
            assert_eq!(class.type_name(), value.type_name());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn class_serializes_as_type_name() {
        assert_eq!(serde_json::to_string(&ValueClass::Float).unwrap(), "\"float\"");
        assert_eq!(serde_json::from_str::<ValueClass>("\"str\"").unwrap(), ValueClass::Str);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_json_scalars_to_matching_variant() {
        let parse = |s: &str| serde_json::from_str::<Value>(s).unwrap();
        assert_eq!(parse("true"), Value::Boolean(true));
        assert_eq!(parse("42"), Value::Integer(42));
        assert_eq!(parse("-7"), Value::Integer(-7));
        assert_eq!(parse("21.5"), Value::Float(21.5));
        assert_eq!(parse("\"Comfort\""), Value::String("Comfort".to_string()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_without_variant_tag() {
        assert_eq!(serde_json::to_string(&Value::Float(21.5)).unwrap(), "21.5");
        assert_eq!(serde_json::to_string(&Value::Integer(3)).unwrap(), "3");
    }
}
