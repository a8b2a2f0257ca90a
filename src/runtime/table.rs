use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::runtime::value::Value;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("missing key {key}")]
    MissingKey { key: String },
    #[error("unhashable key of type {type_name}")]
    UnhashableKey { type_name: &'static str },
}

// Internal key view; ordering keeps iteration (and rendering) deterministic.
enum TableKey<'a> {
    Boolean(bool),
    Number(OrderedFloat<f64>),
    String(&'a str),
}

impl<'a> TableKey<'a> {
    fn from_value(value: &'a Value) -> Result<Self, TableError> {
        match value {
            Value::Boolean(value) => Ok(Self::Boolean(*value)),
            Value::Number(value) => Ok(Self::Number(OrderedFloat(*value))),
            Value::String(text) => Ok(Self::String(text)),
            other => Err(TableError::UnhashableKey {
                type_name: other.type_name(),
            }),
        }
    }
}

/// Keyed mapping with the restricted key set: booleans, numbers, strings.
/// One slot per key type, so `1` and `"1"` never collide.
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    booleans: BTreeMap<bool, Value>,
    numbers: BTreeMap<OrderedFloat<f64>, Value>,
    strings: BTreeMap<String, Value>,
}

impl HashTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Value) -> Result<Value, TableError> {
        let found = match TableKey::from_value(key)? {
            TableKey::Boolean(key) => self.booleans.get(&key),
            TableKey::Number(key) => self.numbers.get(&key),
            TableKey::String(key) => self.strings.get(key),
        };
        found.cloned().ok_or_else(|| TableError::MissingKey {
            key: key.repr(),
        })
    }

    /// Returns whether a mapping already existed for the key.
    pub fn set(&mut self, key: &Value, value: Value) -> Result<bool, TableError> {
        let previous = match TableKey::from_value(key)? {
            TableKey::Boolean(key) => self.booleans.insert(key, value),
            TableKey::Number(key) => self.numbers.insert(key, value),
            TableKey::String(key) => self.strings.insert(key.to_string(), value),
        };
        Ok(previous.is_some())
    }

    /// Returns whether a mapping existed for the key.
    pub fn delete(&mut self, key: &Value) -> Result<bool, TableError> {
        let removed = match TableKey::from_value(key)? {
            TableKey::Boolean(key) => self.booleans.remove(&key),
            TableKey::Number(key) => self.numbers.remove(&key),
            TableKey::String(key) => self.strings.remove(key),
        };
        Ok(removed.is_some())
    }

    pub fn contains(&self, key: &Value) -> Result<bool, TableError> {
        let found = match TableKey::from_value(key)? {
            TableKey::Boolean(key) => self.booleans.contains_key(&key),
            TableKey::Number(key) => self.numbers.contains_key(&key),
            TableKey::String(key) => self.strings.contains_key(key),
        };
        Ok(found)
    }

    pub fn size(&self) -> usize {
        self.booleans.len() + self.numbers.len() + self.strings.len()
    }

    pub fn render(&self) -> String {
        let mut pairs = Vec::with_capacity(self.size());
        for (key, value) in &self.booleans {
            pairs.push(format!("[{key}] = {}", value.repr()));
        }
        for (key, value) in &self.numbers {
            pairs.push(format!("[{key}] = {}", value.repr()));
        }
        for (key, value) in &self.strings {
            pairs.push(format!("[{key:?}] = {}", value.repr()));
        }
        format!("map{{{}}}", pairs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_of_each_hashable_type_are_independent() {
        let mut table = HashTable::new();
        table
            .set(&Value::Number(1.0), Value::string("one"))
            .expect("number key");
        table
            .set(&Value::string("1"), Value::string("str"))
            .expect("string key");
        table
            .set(&Value::Boolean(true), Value::string("yes"))
            .expect("bool key");

        assert_eq!(table.size(), 3);
        assert_eq!(
            table.get(&Value::Number(1.0)).expect("get").to_string(),
            "one"
        );
        assert_eq!(
            table.get(&Value::string("1")).expect("get").to_string(),
            "str"
        );
    }

    #[test]
    fn set_reports_whether_a_key_existed() {
        let mut table = HashTable::new();
        assert!(!table.set(&Value::string("k"), Value::Number(1.0)).expect("set"));
        assert!(table.set(&Value::string("k"), Value::Number(2.0)).expect("set"));
    }

    #[test]
    fn delete_and_contains_report_presence() {
        let mut table = HashTable::new();
        table.set(&Value::Number(3.0), Value::Null).expect("set");
        assert!(table.contains(&Value::Number(3.0)).expect("contains"));
        assert!(table.delete(&Value::Number(3.0)).expect("delete"));
        assert!(!table.delete(&Value::Number(3.0)).expect("delete"));
        assert!(!table.contains(&Value::Number(3.0)).expect("contains"));
    }

    #[test]
    fn missing_and_unhashable_keys_error() {
        let table = HashTable::new();
        assert_eq!(
            table.get(&Value::string("nope")).expect_err("missing key"),
            TableError::MissingKey {
                key: "\"nope\"".to_string()
            }
        );
        assert_eq!(
            table.get(&Value::Null).expect_err("null key"),
            TableError::UnhashableKey { type_name: "null" }
        );
        assert_eq!(
            table.get(&Value::array(vec![])).expect_err("array key"),
            TableError::UnhashableKey { type_name: "array" }
        );
    }

    #[test]
    fn renders_deterministically_by_key_order() {
        let mut table = HashTable::new();
        table.set(&Value::string("b"), Value::Number(2.0)).expect("set");
        table.set(&Value::string("a"), Value::Number(1.0)).expect("set");
        table.set(&Value::Number(7.0), Value::Boolean(true)).expect("set");
        assert_eq!(
            table.render(),
            "map{[7] = true, [\"a\"] = 1, [\"b\"] = 2}"
        );
    }
}
