//! Per-user layout overrides.

use std::collections::BTreeMap;

use async_trait::async_trait;
use quickorder_core::{PanelId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::PanelError;
use crate::width::FieldWidth;

/// Layout override of one field. Absent members keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<FieldWidth>,
}

impl FieldSettings {
    pub fn is_empty(&self) -> bool {
        self.visible.is_none() && self.order.is_none() && self.width.is_none()
    }
}

/// Saved layout of one panel for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsible: Option<bool>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSettings>,
}

impl PanelSettings {
    pub fn field(&self, field_id: &str) -> Option<&FieldSettings> {
        self.fields.get(field_id)
    }

    pub(crate) fn field_mut(&mut self, field_id: &str) -> &mut FieldSettings {
        self.fields.entry(field_id.to_string()).or_default()
    }
}

/// Where layout overrides are loaded from and saved to.
#[async_trait]
pub trait PersonalizationStore: Send + Sync {
    async fn get_user_panel_config(
        &self,
        user_id: &UserId,
        panel_id: &PanelId,
    ) -> Result<Option<PanelSettings>, PanelError>;

    async fn save_user_panel_config(
        &self,
        user_id: &UserId,
        panel_id: &PanelId,
        settings: &PanelSettings,
    ) -> Result<(), PanelError>;
}
