//! `quickorder <order-id> [panel-id...]`: load an order and print a JSON
//! summary, plus the caller's saved layout of each named panel.

use anyhow::{Context, Result, bail};
use quickorder_client::{ClientConfig, Session, order_summary};
use quickorder_core::PanelId;
use quickorder_panel::PersonalizationStore;
use serde_json::{Map, Value};

#[tokio::main]
async fn main() -> Result<()> {
    quickorder_observability::init();

    let mut args = std::env::args().skip(1);
    let Some(raw_id) = args.next() else {
        bail!("usage: quickorder <order-id> [panel-id...]");
    };
    let order_id: i64 = raw_id
        .parse()
        .with_context(|| format!("order id must be a number, got '{raw_id}'"))?;
    let panels: Vec<PanelId> = args.map(PanelId::new).collect();

    let config = ClientConfig::from_env()?;
    let session = Session::connect(config)?;

    let order = session
        .coordinator
        .load_order(order_id)
        .await
        .with_context(|| format!("failed to load order {order_id}"))?;
    let mut summary = order_summary(&order);

    if !panels.is_empty() {
        let mut layouts = Map::new();
        for panel_id in &panels {
            let settings = session
                .layouts
                .get_user_panel_config(&session.config.user_id, panel_id)
                .await
                .with_context(|| format!("failed to load layout of {panel_id}"))?;
            layouts.insert(panel_id.to_string(), serde_json::to_value(settings)?);
        }
        summary["layouts"] = Value::Object(layouts);
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    tracing::info!(order_id, groups = order.resource_groups.len(), "done");
    Ok(())
}
