//! Closed value type for installation context data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A context value supplied at install time.
///
/// Mappings are key-sorted, so anything iterating over them (template
/// `range`, serialization) is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// An empty mapping.
    pub fn mapping() -> Self {
        Value::Mapping(BTreeMap::new())
    }

    /// Look up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Insert into a mapping, returning the updated value. Non-mapping values
    /// are replaced by a fresh mapping.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !matches!(self, Value::Mapping(_)) {
            self = Value::mapping();
        }
        if let Value::Mapping(map) = &mut self {
            map.insert(key.into(), value.into());
        }
        self
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Mapping(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nested_yaml_context() {
        let value: Value = serde_yaml::from_str(
            "cidr: 10.0.0.0/16\nreplicas: 3\nratio: 0.5\nenabled: true\nzones: [a, b]\nextra: ~\n",
        )
        .unwrap();

        assert_eq!(value.get("cidr"), Some(&Value::from("10.0.0.0/16")));
        assert_eq!(value.get("replicas"), Some(&Value::Integer(3)));
        assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(value.get("enabled"), Some(&Value::Bool(true)));
        assert_eq!(value.get("zones"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(value.get("extra"), Some(&Value::Null));
    }

    #[test]
    fn mapping_keys_serialize_sorted() {
        let value: Value = [("zeta", 1_i64), ("alpha", 2), ("mid", 3)].into_iter().collect();
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"alpha":2,"mid":3,"zeta":1}"#);
    }
}
