//! Query parameter types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single query parameter value.
///
/// Values keep their original shape until serialization: dates render
/// as ISO-8601, objects as JSON, lists expand to one pair per element
/// and `Null` entries are dropped from the query string entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Absent value; the whole pair is skipped during serialization.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Plain text value.
    Text(String),
    /// Timestamp, serialized as ISO-8601 with millisecond precision.
    Date(DateTime<Utc>),
    /// List value; the key is suffixed with `[]` and one pair is
    /// emitted per element.
    List(Vec<ParamValue>),
    /// Structured value, serialized as a JSON string.
    Object(serde_json::Value),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        Self::List(value)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Object(value)
    }
}

/// An ordered collection of query parameters.
///
/// Insertion order is preserved so the serialized query string is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    items: Vec<(String, ParamValue)>,
}

impl QueryParams {
    /// Creates an empty parameter collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a parameter to the collection.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.items.push((key.into(), value.into()));
    }

    /// Returns an iterator over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(String, ParamValue)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_preserve_insertion_order() {
        let mut params = QueryParams::new();
        params.add("z", "last");
        params.add("a", 1);
        params.add("m", true);

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(ParamValue::from("x"), ParamValue::Text("x".to_string()));
        assert_eq!(ParamValue::from(3_i64), ParamValue::Int(3));
        assert_eq!(ParamValue::from(false), ParamValue::Bool(false));
    }

    #[test]
    fn test_empty() {
        let params = QueryParams::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }
}
