use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quickorder_core::{ModeFlag, PanelId, UserId};
use quickorder_lookup::{LookupError, LookupOption, OptionQuery, OptionSource};
use quickorder_panel::{FieldSettings, PanelSettings, PersonalizationStore};
use quickorder_store::QuickOrder;
use quickorder_sync::{
    ApiEnvelope, AttachmentUpload, MasterDataOptions, MasterDataRequest, PersonalizationRequest,
    QuickOrderApi, RemotePersonalizationStore, TransportError,
};
use serde_json::json;

/// Records requests; personalization rows live in memory.
#[derive(Default)]
struct RecordingApi {
    lookups: Mutex<Vec<MasterDataRequest>>,
    saves: Mutex<Vec<PersonalizationRequest>>,
    rows: Mutex<Vec<PersonalizationRequest>>,
    lookup_down: bool,
}

#[async_trait]
impl QuickOrderApi for RecordingApi {
    async fn get_quick_order(&self, _order_id: i64) -> Result<ApiEnvelope, TransportError> {
        Err(TransportError::Network("unused".into()))
    }

    async fn update_quick_order_resource(&self, _order: &QuickOrder) -> Result<ApiEnvelope, TransportError> {
        Err(TransportError::Network("unused".into()))
    }

    async fn get_master_common_data(&self, request: &MasterDataRequest) -> Result<ApiEnvelope, TransportError> {
        self.lookups.lock().unwrap().push(request.clone());
        if self.lookup_down {
            return Err(TransportError::Api {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        Ok(ApiEnvelope::new(
            json!([{ "id": 1, "name": "Covered wagon" }, { "id": "F2", "name": "Flat wagon" }]).to_string(),
        ))
    }

    async fn get_personalization(&self, request: &PersonalizationRequest) -> Result<ApiEnvelope, TransportError> {
        let rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.screen_name == request.screen_name)
            .map(|row| {
                json!({
                    "LevelType": row.level_type,
                    "ScreenName": row.screen_name,
                    "ComponentName": row.component_name,
                    "JsonData": row.json_data,
                })
            })
            .collect();
        Ok(ApiEnvelope::new(json!(rows).to_string()))
    }

    async fn save_personalization(&self, request: &PersonalizationRequest) -> Result<ApiEnvelope, TransportError> {
        self.saves.lock().unwrap().push(request.clone());
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|row| row.component_name != request.component_name);
        rows.push(request.clone());
        Ok(ApiEnvelope::new(""))
    }

    async fn upload_attachment(&self, _upload: AttachmentUpload) -> Result<ApiEnvelope, TransportError> {
        Err(TransportError::Network("unused".into()))
    }

    async fn download_attachment(&self, _unique_name: &str) -> Result<ApiEnvelope, TransportError> {
        Err(TransportError::Network("unused".into()))
    }
}

#[tokio::test]
async fn master_data_rows_become_lookup_options() {
    let api = Arc::new(RecordingApi::default());
    let source = MasterDataOptions::new(api.clone(), "Wagon type Init");

    let query = OptionQuery {
        search_term: " wag ".into(),
        offset: 20,
        limit: 2,
    };
    let page = source.fetch_options(query.clone()).await.unwrap();
    assert_eq!(
        page.options,
        vec![LookupOption::new("1", "Covered wagon"), LookupOption::new("F2", "Flat wagon")]
    );
    assert!(page.more_available(&query));

    let sent = api.lookups.lock().unwrap()[0].clone();
    assert_eq!(sent.message_type, "Wagon type Init");
    assert_eq!(sent.search_term.as_deref(), Some("wag"));
    assert_eq!((sent.offset, sent.limit), (Some(20), Some(2)));
}

#[tokio::test]
async fn master_data_failures_surface_as_source_errors() {
    let api = Arc::new(RecordingApi {
        lookup_down: true,
        ..RecordingApi::default()
    });
    let source = MasterDataOptions::new(api, "Tariff Init");
    let err = source
        .fetch_options(OptionQuery {
            search_term: String::new(),
            offset: 0,
            limit: 20,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Source(msg) if msg.contains("502")));
}

#[tokio::test]
async fn layouts_insert_once_then_update() {
    let api = Arc::new(RecordingApi::default());
    let store = RemotePersonalizationStore::new(api.clone(), "QuickOrder");
    let user = UserId::new("planner-7");
    let panel = PanelId::new("billing-details");

    assert_eq!(store.get_user_panel_config(&user, &panel).await.unwrap(), None);

    let mut settings = PanelSettings {
        title: Some("Billing".into()),
        ..PanelSettings::default()
    };
    settings.fields.insert(
        "Tariff".into(),
        FieldSettings {
            visible: Some(false),
            ..FieldSettings::default()
        },
    );
    store.save_user_panel_config(&user, &panel, &settings).await.unwrap();
    store.save_user_panel_config(&user, &panel, &settings).await.unwrap();

    let saves = api.saves.lock().unwrap().clone();
    assert_eq!(saves[0].mode_flag, Some(ModeFlag::Insert));
    assert_eq!(saves[1].mode_flag, Some(ModeFlag::Update));
    assert_eq!(saves[0].level_type, "User");
    assert_eq!(saves[0].component_name, "billing-details");

    // A fresh adapter learns the row exists from the first read.
    let reopened = RemotePersonalizationStore::new(api.clone(), "QuickOrder");
    assert_eq!(reopened.get_user_panel_config(&user, &panel).await.unwrap(), Some(settings.clone()));
    reopened.save_user_panel_config(&user, &panel, &settings).await.unwrap();
    assert_eq!(api.saves.lock().unwrap()[2].mode_flag, Some(ModeFlag::Update));
}
