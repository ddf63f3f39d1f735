//! Mapping between panel fields and backend columns.
//!
//! A lookup field `Tariff` holding `"T01 || Rail tariff"` is stored as two
//! columns (`Tariff = "T01"`, `TariffDescription = "Rail tariff"`); a measured
//! field `Qty` holding `{dropdown: "KG", input: "12"}` as `Qty = "12"`,
//! `QtyUOM = "KG"`. Plain fields are stored as-is.

use std::collections::BTreeMap;

use quickorder_codec::{format_with_label, is_lookup_pair, is_measured_pair, split_composites};
use quickorder_core::Record;
use quickorder_panel::{FieldKind, FieldValue, FormValues, PanelConfig};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnBinding {
    Scalar,
    Lookup { label_column: String },
    Measured { unit_column: String },
}

impl ColumnBinding {
    pub fn lookup(field_id: &str) -> Self {
        Self::Lookup {
            label_column: format!("{field_id}Description"),
        }
    }

    pub fn measured(field_id: &str) -> Self {
        Self::Measured {
            unit_column: format!("{field_id}UOM"),
        }
    }
}

/// Field id → column binding for one panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    bindings: BTreeMap<String, ColumnBinding>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings derived from field kinds. Cards hold no backend data and are
    /// left out.
    pub fn for_panel(config: &PanelConfig) -> Self {
        let bindings = config
            .fields
            .iter()
            .filter(|(_, d)| !matches!(d.kind, FieldKind::Card))
            .map(|(id, d)| {
                let binding = if d.kind.is_lookup() {
                    ColumnBinding::lookup(id)
                } else if d.kind.is_measured() {
                    ColumnBinding::measured(id)
                } else {
                    ColumnBinding::Scalar
                };
                (id.clone(), binding)
            })
            .collect();
        Self { bindings }
    }

    pub fn bind(mut self, field_id: impl Into<String>, binding: ColumnBinding) -> Self {
        self.bindings.insert(field_id.into(), binding);
        self
    }

    pub fn binding(&self, field_id: &str) -> Option<&ColumnBinding> {
        self.bindings.get(field_id)
    }

    /// Form values → backend columns. Fields without a binding are skipped.
    pub fn flatten(&self, values: &FormValues) -> Record {
        let mut out = Record::new();
        for (field_id, value) in values {
            let Some(binding) = self.bindings.get(field_id) else {
                continue;
            };
            match binding {
                ColumnBinding::Scalar => {
                    out.insert(field_id.as_str(), value.to_json());
                }
                ColumnBinding::Lookup { label_column } => {
                    flatten_lookup(&mut out, field_id, label_column, split_composites(&value.to_json()));
                }
                ColumnBinding::Measured { unit_column } => {
                    flatten_measured(&mut out, field_id, unit_column, split_composites(&value.to_json()));
                }
            }
        }
        out
    }

    /// Backend columns → form values. Fields whose column is absent are
    /// skipped so panel defaults survive.
    pub fn hydrate(&self, record: &Record) -> FormValues {
        let mut values = FormValues::new();
        for (field_id, binding) in &self.bindings {
            let Some(raw) = record.get(field_id) else {
                continue;
            };
            let value = match binding {
                ColumnBinding::Scalar => FieldValue::from_json(raw),
                ColumnBinding::Lookup { label_column } => hydrate_lookup(raw, record.get(label_column)),
                ColumnBinding::Measured { unit_column } => FieldValue::pair(
                    record.get_str(unit_column).unwrap_or_default(),
                    record.get_str(field_id).unwrap_or_default(),
                ),
            };
            values.insert(field_id.clone(), value);
        }
        values
    }
}

fn pair_parts(map: &Map<String, Value>) -> (Value, Value) {
    (
        map.get("value").cloned().unwrap_or(Value::Null),
        map.get("label").cloned().unwrap_or(Value::Null),
    )
}

fn flatten_lookup(out: &mut Record, field_id: &str, label_column: &str, split: Value) {
    match split {
        Value::Object(map) if is_lookup_pair(&map) => {
            let (value, label) = pair_parts(&map);
            out.insert(field_id, value);
            out.insert(label_column, label);
        }
        Value::Array(items) => {
            let (ids, labels): (Vec<Value>, Vec<Value>) = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) if is_lookup_pair(&map) => pair_parts(&map),
                    other => (other, Value::String(String::new())),
                })
                .unzip();
            out.insert(field_id, Value::Array(ids));
            out.insert(label_column, Value::Array(labels));
        }
        Value::String(s) if s.trim().is_empty() => {
            out.insert(field_id, Value::String(String::new()));
            out.insert(label_column, Value::String(String::new()));
        }
        // An id without a label must not inherit the stored label.
        other => {
            let label = if other.is_null() { Value::Null } else { Value::String(String::new()) };
            out.insert(field_id, other);
            out.insert(label_column, label);
        }
    }
}

fn flatten_measured(out: &mut Record, field_id: &str, unit_column: &str, split: Value) {
    match split {
        Value::Object(map) if is_measured_pair(&map) => {
            let unit = match map.get("dropdown") {
                Some(Value::Object(inner)) if is_lookup_pair(inner) => pair_parts(inner).0,
                Some(other) => other.clone(),
                None => Value::Null,
            };
            out.insert(field_id, map.get("input").cloned().unwrap_or(Value::Null));
            out.insert(unit_column, unit);
        }
        other => {
            out.insert(field_id, other);
            out.insert(unit_column, Value::Null);
        }
    }
}

fn hydrate_lookup(raw: &Value, label: Option<&Value>) -> FieldValue {
    match (raw, label) {
        (Value::Array(ids), Some(Value::Array(labels))) => FieldValue::Many(
            ids.iter()
                .enumerate()
                .map(|(i, id)| format_with_label(&scalar(id), &labels.get(i).map(scalar).unwrap_or_default()))
                .collect(),
        ),
        (Value::Array(ids), _) => FieldValue::Many(ids.iter().map(scalar).collect()),
        (Value::Null, _) => FieldValue::Empty,
        (id, label) => FieldValue::Text(format_with_label(&scalar(id), &label.map(scalar).unwrap_or_default())),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
