//! HTTP client for the quick-order backend and the wiring used by the
//! `quickorder` binary.

pub mod config;
pub mod http;
pub mod local_storage;

use std::sync::Arc;

use anyhow::Result;
use quickorder_panel::CachedPersonalizationStore;
use quickorder_store::{InMemoryOrderRepository, QuickOrder};
use quickorder_sync::{RemotePersonalizationStore, SyncCoordinator};
use serde_json::{Value, json};

pub use config::ClientConfig;
pub use http::HttpQuickOrderApi;
pub use local_storage::FileLocalStorage;

/// Screen that owns the quick-order panels in the personalization tables.
pub const SCREEN_NAME: &str = "QuickOrder";

pub type Coordinator = SyncCoordinator<InMemoryOrderRepository, HttpQuickOrderApi>;

pub type LayoutStore =
    CachedPersonalizationStore<RemotePersonalizationStore<HttpQuickOrderApi>, FileLocalStorage>;

/// Everything a session needs, built from one config.
pub struct Session {
    pub config: ClientConfig,
    pub api: Arc<HttpQuickOrderApi>,
    pub coordinator: Coordinator,
    pub layouts: LayoutStore,
}

impl Session {
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let api = Arc::new(HttpQuickOrderApi::new(&config)?);
        let store = Arc::new(InMemoryOrderRepository::new());
        let coordinator = SyncCoordinator::new(store, api.clone());
        let layouts = CachedPersonalizationStore::new(
            RemotePersonalizationStore::new(api.clone(), SCREEN_NAME),
            FileLocalStorage::open(&config.cache_dir)?,
        );
        tracing::info!(api_url = %config.api_url, user_id = %config.user_id, "session ready");
        Ok(Self {
            config,
            api,
            coordinator,
            layouts,
        })
    }
}

/// Short description of a loaded order.
pub fn order_summary(order: &QuickOrder) -> Value {
    let groups: Vec<Value> = order
        .resource_groups
        .iter()
        .map(|group| {
            json!({
                "id": group.id,
                "status": group.status,
                "planLines": group.plan_details.len(),
                "actualLines": group.actual_details.len(),
                "attachments": group.attachments.len(),
            })
        })
        .collect();
    json!({
        "id": order.id,
        "orderNo": order.order_no,
        "orderType": order.order_type,
        "currency": order.currency,
        "resourceGroups": groups,
        "attachments": order.attachments.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickorder_core::EntityId;
    use quickorder_store::ResourceGroup;

    #[test]
    fn summary_counts_children() {
        let order = QuickOrder {
            id: EntityId::Assigned(812),
            order_no: Some("QO/2024/0001".into()),
            currency: "EUR".into(),
            resource_groups: vec![ResourceGroup {
                id: EntityId::Assigned(41),
                ..ResourceGroup::default()
            }],
            ..QuickOrder::default()
        };
        let summary = order_summary(&order);
        assert_eq!(summary["id"], json!(812));
        assert_eq!(summary["orderNo"], json!("QO/2024/0001"));
        assert_eq!(summary["resourceGroups"][0]["id"], json!(41));
        assert_eq!(summary["resourceGroups"][0]["planLines"], json!(0));
    }
}
