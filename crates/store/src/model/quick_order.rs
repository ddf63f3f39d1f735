use quickorder_core::{AggregateRoot, EntityId, ModeFlag, Record};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::resource_group::ResourceGroup;
use super::status::OrderType;

/// Root aggregate: submitted whole, replaced whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickOrder {
    #[serde(rename = "QuickUniqueID", default)]
    pub id: EntityId,
    #[serde(rename = "QuickOrderNo", default, skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,
    #[serde(rename = "OrderType", default)]
    pub order_type: OrderType,
    #[serde(rename = "Currency", default)]
    pub currency: String,
    #[serde(rename = "ModeFlag", default)]
    pub mode_flag: ModeFlag,
    #[serde(rename = "ResourceGroup", default)]
    pub resource_groups: Vec<ResourceGroup>,
    #[serde(rename = "Attachments", default)]
    pub attachments: Vec<Attachment>,
    /// Header columns (contract, customer/vendor, cluster, dates, remarks...).
    #[serde(flatten)]
    pub header: Record,
}

impl QuickOrder {
    /// Whether the server has never seen this order.
    pub fn is_staged(&self) -> bool {
        self.id.is_staged()
    }
}

impl AggregateRoot for QuickOrder {
    type Id = EntityId;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn mode_flag(&self) -> ModeFlag {
        self.mode_flag
    }
}

/// Replace-merge update of the order root. `None` keeps the current value;
/// `header` columns are merged over the current header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuickOrderPatch {
    pub id: Option<EntityId>,
    pub order_no: Option<String>,
    pub order_type: Option<OrderType>,
    pub currency: Option<String>,
    pub mode_flag: Option<ModeFlag>,
    pub header: Record,
}

impl QuickOrderPatch {
    pub fn header(header: Record) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    pub fn mode_flag(mut self, flag: ModeFlag) -> Self {
        self.mode_flag = Some(flag);
        self
    }

    pub(crate) fn apply(self, order: &mut QuickOrder) {
        if let Some(id) = self.id {
            order.id = id;
        }
        if let Some(order_no) = self.order_no {
            order.order_no = Some(order_no);
        }
        if let Some(order_type) = self.order_type {
            order.order_type = order_type;
        }
        if let Some(currency) = self.currency {
            order.currency = currency;
        }
        if let Some(flag) = self.mode_flag {
            order.mode_flag = flag;
        }
        order.header.merge(self.header);
    }
}
