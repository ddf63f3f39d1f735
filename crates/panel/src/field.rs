//! Field descriptors and values.

use std::sync::Arc;

use quickorder_codec::truncate_composite;
use quickorder_lookup::LookupOption;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::width::FieldWidth;

/// Widget type of a field, with the data each type needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fieldType", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Date,
    Time,
    Select {
        #[serde(default)]
        options: Vec<LookupOption>,
    },
    Radio {
        #[serde(default)]
        options: Vec<LookupOption>,
    },
    Search,
    /// Unit dropdown paired with a free input (quantity + UOM).
    InputDropdown {
        #[serde(default)]
        options: Vec<LookupOption>,
    },
    /// Remote, paginated dropdown backed by a master-data message type.
    LazySelect {
        #[serde(rename = "messageType")]
        message_type: String,
        #[serde(default)]
        multiple: bool,
    },
    /// Read-only summary tile.
    Card,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::Select { .. } => "select",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Search => "search",
            FieldKind::InputDropdown { .. } => "inputdropdown",
            FieldKind::LazySelect { .. } => "lazyselect",
            FieldKind::Card => "card",
        }
    }

    /// Fields whose value is an `"ID || Label"` display string.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            FieldKind::Select { .. } | FieldKind::Radio { .. } | FieldKind::LazySelect { .. }
        )
    }

    /// Fields whose value is a `{dropdown, input}` pair.
    pub fn is_measured(&self) -> bool {
        matches!(self, FieldKind::InputDropdown { .. })
    }

    /// Static options, if the type has any.
    pub fn options(&self) -> &[LookupOption] {
        match self {
            FieldKind::Select { options }
            | FieldKind::Radio { options }
            | FieldKind::InputDropdown { options } => options,
            _ => &[],
        }
    }
}

/// Current value of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Pair { dropdown: String, input: String },
    Many(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn pair(dropdown: impl Into<String>, input: impl Into<String>) -> Self {
        Self::Pair {
            dropdown: dropdown.into(),
            input: input.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Nothing meaningful entered, regardless of field type.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Pair { dropdown, input } => {
                dropdown.trim().is_empty() && input.trim().is_empty()
            }
            FieldValue::Many(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    /// Lenient conversion from a stored JSON value.
    ///
    /// Numbers and booleans become text; `{dropdown, input}` objects become
    /// pairs; arrays of scalars become `Many`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Empty,
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => FieldValue::Text(n.to_string()),
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Array(items) => {
                FieldValue::Many(items.iter().filter_map(scalar_text).collect())
            }
            Value::Object(map) => FieldValue::Pair {
                dropdown: map.get("dropdown").and_then(scalar_text).unwrap_or_default(),
                input: map.get("input").and_then(scalar_text).unwrap_or_default(),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Identifier portion of a lookup value.
    pub fn lookup_id(&self) -> Option<&str> {
        self.as_text().map(truncate_composite).filter(|s| !s.trim().is_empty())
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

type ChangeHook = Arc<dyn Fn(&str, &FieldValue) + Send + Sync>;

/// Runtime hooks attached to a field (not part of the declarative config).
#[derive(Clone, Default)]
pub struct FieldEvents {
    on_change: Option<ChangeHook>,
}

impl FieldEvents {
    pub fn on_change(hook: impl Fn(&str, &FieldValue) + Send + Sync + 'static) -> Self {
        Self {
            on_change: Some(Arc::new(hook)),
        }
    }

    pub(crate) fn fire_change(&self, field_id: &str, value: &FieldValue) {
        if let Some(hook) = &self.on_change {
            hook(field_id, value);
        }
    }
}

impl core::fmt::Debug for FieldEvents {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldEvents")
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

fn default_true() -> bool {
    true
}

/// Declarative description of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub width: FieldWidth,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(skip)]
    pub events: FieldEvents,
}

impl FieldDescriptor {
    pub fn new(label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            kind,
            width: FieldWidth::default(),
            value: FieldValue::Empty,
            mandatory: false,
            visible: true,
            editable: true,
            order: 0,
            events: FieldEvents::default(),
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn width(mut self, width: FieldWidth) -> Self {
        self.width = width;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn value(mut self, value: FieldValue) -> Self {
        self.value = value;
        self
    }

    pub fn events(mut self, events: FieldEvents) -> Self {
        self.events = events;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_deserializes_tagged_kind() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "fieldType": "lazyselect",
            "label": "Wagon type",
            "messageType": "Wagon type Init",
            "width": "half",
            "mandatory": true,
            "order": 3
        }))
        .unwrap();

        assert_eq!(
            field.kind,
            FieldKind::LazySelect { message_type: "Wagon type Init".into(), multiple: false }
        );
        assert_eq!(field.width, FieldWidth::Half);
        assert!(field.mandatory && field.visible && field.editable);
        assert_eq!(field.value, FieldValue::Empty);
    }

    #[test]
    fn value_shapes_deserialize() {
        let values: Vec<FieldValue> = serde_json::from_value(json!([
            null,
            "T01 || Tariff",
            { "dropdown": "KG", "input": "10" },
            ["A", "B"]
        ]))
        .unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Empty,
                FieldValue::text("T01 || Tariff"),
                FieldValue::pair("KG", "10"),
                FieldValue::Many(vec!["A".into(), "B".into()]),
            ]
        );
    }

    #[test]
    fn from_json_is_lenient_with_backend_scalars() {
        assert_eq!(FieldValue::from_json(&json!(12.5)), FieldValue::text("12.5"));
        assert_eq!(
            FieldValue::from_json(&json!({ "dropdown": "TON", "input": 3 })),
            FieldValue::pair("TON", "3")
        );
        assert_eq!(FieldValue::text("C1 || North").lookup_id(), Some("C1"));
    }
}
