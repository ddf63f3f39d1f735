use std::collections::BTreeMap;

use quickorder_core::PanelId;
use serde::{Deserialize, Serialize};

use crate::field::{FieldDescriptor, FieldKind};

/// Declarative definition of one panel (business form).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    pub panel_id: PanelId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub collapsible: bool,
    pub fields: BTreeMap<String, FieldDescriptor>,
}

impl PanelConfig {
    pub fn new(panel_id: impl Into<PanelId>, title: impl Into<String>) -> Self {
        Self {
            panel_id: panel_id.into(),
            title: title.into(),
            collapsible: false,
            fields: BTreeMap::new(),
        }
    }

    pub fn collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = collapsible;
        self
    }

    pub fn field(mut self, id: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(id.into(), descriptor);
        self
    }

    pub fn descriptor(&self, field_id: &str) -> Option<&FieldDescriptor> {
        self.fields.get(field_id)
    }

    pub fn kind(&self, field_id: &str) -> Option<&FieldKind> {
        self.fields.get(field_id).map(|d| &d.kind)
    }
}
