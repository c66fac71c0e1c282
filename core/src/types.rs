//! Domain DTOs for the CRM API.
//!
//! # Design
//! Entities are open JSON objects rather than one struct per entity: the
//! client must round-trip fields it does not know about (server-side
//! columns, relations a form never loaded) so merge-before-write can
//! preserve them. `Resource::fields` supplies the typed view where one is
//! needed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single entity record: a JSON object keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

/// Reference to another record inside a relation array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: i64,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric `id`, if present. Integral floats are accepted.
    pub fn id(&self) -> Option<i64> {
        match self.0.get("id")? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// The `{id}` references of a relation field, dropping everything else
    /// each related object carries. Entries without a numeric id are skipped.
    pub fn relation_refs(&self, field: &str) -> Vec<RelationRef> {
        let Some(Value::Array(items)) = self.0.get(field) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => obj.get("id").and_then(Value::as_i64),
                Value::Number(n) => n.as_i64(),
                _ => None,
            })
            .map(|id| RelationRef { id })
            .collect()
    }

    /// Display text for a field: strings unquoted, everything else as JSON.
    pub fn display_value(&self, field: &str) -> String {
        match self.0.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item.get("id") {
                    Some(id) => id.to_string(),
                    None => item.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Some(other) => other.to_string(),
        }
    }

}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Overlay `partial` on `existing` and pin `id` to the path id.
///
/// Fields from `partial` win; fields only in `existing` survive untouched;
/// any `id` carried by either side is replaced.
pub fn merge_for_update(existing: Record, partial: &Record, id: i64) -> Record {
    let mut merged = existing.0;
    for (key, value) in &partial.0 {
        merged.insert(key.clone(), value.clone());
    }
    merged.insert("id".to_string(), Value::from(id));
    Record(merged)
}

/// Body of a login or registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body the identity service answers a login with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
