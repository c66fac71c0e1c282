//! Add/edit form values and the type coercion applied to user input.

use std::collections::BTreeMap;

use serde_json::{Number, Value};
use thiserror::Error;

use crate::resource::{FieldKind, Resource};
use crate::types::{Record, RelationRef};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{resource} has no field '{field}'")]
    UnknownField { resource: &'static str, field: String },

    #[error("'{value}' is not a record id for {field}")]
    InvalidRelation { field: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { id: i64 },
}

/// One record a relation field can point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationOption {
    pub id: i64,
    pub label: String,
}

impl RelationOption {
    /// `label` read from `record`, or `#id` when the record has none.
    pub fn from_record(record: &Record, label: &str) -> Option<Self> {
        let id = record.id()?;
        let text = record.display_value(label);
        Some(Self {
            id,
            label: if text.trim().is_empty() { format!("#{id}") } else { text },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    resource: Resource,
    mode: FormMode,
    values: Record,
    options: BTreeMap<&'static str, Vec<RelationOption>>,
    /// Failure message of the last submit, shown inline.
    pub error: Option<String>,
}

impl FormState {
    /// Empty form seeded with each field's default.
    pub fn new_add(resource: Resource) -> Self {
        let mut values = Record::new();
        for field in resource.fields() {
            values.insert(field.name, field.kind.default_value());
        }
        Self {
            resource,
            mode: FormMode::Add,
            values,
            options: BTreeMap::new(),
            error: None,
        }
    }

    /// Form seeded from `record`; relations keep only their `{id}`s and
    /// missing or null fields fall back to defaults.
    pub fn new_edit(resource: Resource, record: &Record, id: i64) -> Self {
        let mut values = Record::new();
        for field in resource.fields() {
            let value = match field.kind {
                FieldKind::Relation { .. } => relation_value(record.relation_refs(field.name)),
                _ => match record.get(field.name) {
                    None | Some(Value::Null) => field.kind.default_value(),
                    Some(v) => v.clone(),
                },
            };
            values.insert(field.name, value);
        }
        Self {
            resource,
            mode: FormMode::Edit { id },
            values,
            options: BTreeMap::new(),
            error: None,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Choices loaded for a relation field. Empty until loaded.
    pub fn relation_options(&self, field: &str) -> &[RelationOption] {
        self.options.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Install the choices for relation `field` from the target's records.
    /// Records without an id are skipped; other fields are ignored.
    pub fn set_relation_options(&mut self, field: &str, records: &[Record]) {
        let Some(spec) = self.resource.field(field) else {
            return;
        };
        let FieldKind::Relation { label, .. } = spec.kind else {
            return;
        };
        let options = records
            .iter()
            .filter_map(|r| RelationOption::from_record(r, label))
            .collect();
        self.options.insert(spec.name, options);
    }

    /// Set `field` from raw user input, coerced by the field's kind.
    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        let value = coerce_field(self.resource, field, raw)?;
        self.values.insert(field, value);
        Ok(())
    }

    /// The body to submit. Edit payloads never carry `id`; the path does.
    pub fn payload(&self) -> Record {
        let mut payload = self.values.clone();
        if matches!(self.mode, FormMode::Edit { .. }) {
            payload.remove("id");
        }
        payload
    }
}

/// Coerce raw input for `field` of `resource`.
///
/// Numbers that do not parse become `null`, the same value an unparseable
/// number input serializes to; relations must be id lists.
pub fn coerce_field(resource: Resource, field: &str, raw: &str) -> Result<Value, FormError> {
    let spec = resource.field(field).ok_or_else(|| FormError::UnknownField {
        resource: resource.singular(),
        field: field.to_string(),
    })?;
    Ok(match spec.kind {
        FieldKind::Text => Value::String(raw.to_string()),
        FieldKind::Integer => raw.trim().parse::<i64>().map(Value::from).unwrap_or(Value::Null),
        FieldKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldKind::Relation { .. } => relation_value(parse_ids(field, raw)?),
    })
}

fn parse_ids(field: &str, raw: &str) -> Result<Vec<RelationRef>, FormError> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map(|id| RelationRef { id })
                .map_err(|_| FormError::InvalidRelation {
                    field: field.to_string(),
                    value: part.to_string(),
                })
        })
        .collect()
}

fn relation_value(refs: Vec<RelationRef>) -> Value {
    Value::Array(
        refs.into_iter()
            .map(|r| serde_json::json!({ "id": r.id }))
            .collect(),
    )
}
