//! Schema-less records as returned by the transport.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;

/// Identifier assigned to records by the external store.
pub type RecordId = i64;

/// Conventional id meaning "create a new record".
pub const NEW_RECORD_ID: RecordId = 0;

/// A record keyed by field name.
///
/// Values may be primitives, date strings or nested objects. The core never
/// owns records long-term: they are fetched, filtered, rendered and optionally
/// sent back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `id` field, when present and integral.
    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(ModelError::NotAnObject("null")),
            Value::Bool(_) => Err(ModelError::NotAnObject("boolean")),
            Value::Number(_) => Err(ModelError::NotAnObject("number")),
            Value::String(_) => Err(ModelError::NotAnObject("string")),
            Value::Array(_) => Err(ModelError::NotAnObject("array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_reads_integer_field() {
        let record = Record::new().with("id", 7).with("name", "Alice");
        assert_eq!(record.id(), Some(7));
        assert_eq!(record.get("name"), Some(&json!("Alice")));
    }

    #[test]
    fn id_ignores_non_integer_values() {
        let record = Record::new().with("id", "seven");
        assert_eq!(record.id(), None);
    }

    #[test]
    fn try_from_rejects_non_objects() {
        let err = Record::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(err, ModelError::NotAnObject("array"));
    }
}
