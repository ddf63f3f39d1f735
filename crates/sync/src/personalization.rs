//! Panel layouts kept on the backend, one row per user and panel.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quickorder_core::{ModeFlag, PanelId, UserId};
use quickorder_panel::{PanelError, PanelSettings, PersonalizationStore};

use crate::api::{PersonalizationRequest, PersonalizationRow, QuickOrderApi};

const LEVEL_TYPE: &str = "User";

/// `PersonalizationStore` over the personalization endpoints. The user is
/// resolved by the backend from the bearer token.
pub struct RemotePersonalizationStore<A> {
    api: Arc<A>,
    screen_name: String,
    // Rows the backend already holds; the first save of any other row is an insert.
    known: Mutex<HashSet<(UserId, PanelId)>>,
}

impl<A: QuickOrderApi> RemotePersonalizationStore<A> {
    pub fn new(api: Arc<A>, screen_name: impl Into<String>) -> Self {
        Self {
            api,
            screen_name: screen_name.into(),
            known: Mutex::new(HashSet::new()),
        }
    }

    fn request(&self, panel_id: &PanelId) -> PersonalizationRequest {
        PersonalizationRequest {
            level_type: LEVEL_TYPE.to_string(),
            screen_name: self.screen_name.clone(),
            component_name: panel_id.to_string(),
            ..PersonalizationRequest::default()
        }
    }

    fn is_known(&self, user_id: &UserId, panel_id: &PanelId) -> bool {
        self.known
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(user_id.clone(), panel_id.clone()))
    }

    fn remember(&self, user_id: &UserId, panel_id: &PanelId) {
        self.known
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((user_id.clone(), panel_id.clone()));
    }
}

#[async_trait]
impl<A: QuickOrderApi> PersonalizationStore for RemotePersonalizationStore<A> {
    async fn get_user_panel_config(
        &self,
        user_id: &UserId,
        panel_id: &PanelId,
    ) -> Result<Option<PanelSettings>, PanelError> {
        let envelope = self
            .api
            .get_personalization(&self.request(panel_id))
            .await
            .map_err(|e| PanelError::personalization(e.to_string()))?;
        if envelope.response_data.trim().is_empty() {
            return Ok(None);
        }
        let rows: Vec<PersonalizationRow> = envelope
            .parse()
            .map_err(|e| PanelError::personalization(e.to_string()))?;

        let Some(row) = rows.into_iter().find(|row| row.component_name == panel_id.as_str()) else {
            return Ok(None);
        };
        self.remember(user_id, panel_id);
        match row.json_data.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(|e| PanelError::personalization(format!("unreadable layout of {panel_id}: {e}"))),
        }
    }

    async fn save_user_panel_config(
        &self,
        user_id: &UserId,
        panel_id: &PanelId,
        settings: &PanelSettings,
    ) -> Result<(), PanelError> {
        let json = serde_json::to_string(settings).map_err(|e| PanelError::personalization(e.to_string()))?;
        let mode_flag = if self.is_known(user_id, panel_id) {
            ModeFlag::Update
        } else {
            ModeFlag::Insert
        };
        let request = PersonalizationRequest {
            json_data: Some(json),
            mode_flag: Some(mode_flag),
            ..self.request(panel_id)
        };

        let envelope = self
            .api
            .save_personalization(&request)
            .await
            .map_err(|e| PanelError::personalization(e.to_string()))?;
        if envelope.reported_failure() {
            let message = envelope.message.unwrap_or_else(|| "personalization not saved".to_string());
            return Err(PanelError::personalization(message));
        }
        self.remember(user_id, panel_id);
        tracing::debug!(%user_id, %panel_id, %mode_flag, "layout saved");
        Ok(())
    }
}
