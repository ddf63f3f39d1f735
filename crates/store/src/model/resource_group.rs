use quickorder_core::{Entity, EntityId, ModeFlag, Record, Tracked};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::line::{ActualDetail, PlanDetail};
use super::status::ResourceStatus;

/// One priced resource of the order with its plan/actual lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    #[serde(rename = "ResourceUniqueID", default)]
    pub id: EntityId,
    #[serde(rename = "ResourceStatus", default)]
    pub status: ResourceStatus,
    #[serde(rename = "ModeFlag", default)]
    pub mode_flag: ModeFlag,
    #[serde(rename = "BasicDetails", default)]
    pub basic_details: Record,
    #[serde(rename = "OperationalDetails", default)]
    pub operational_details: Record,
    #[serde(rename = "BillingDetails", default)]
    pub billing_details: Record,
    #[serde(rename = "MoreRefDocs", default)]
    pub more_ref_docs: Record,
    #[serde(rename = "PlanDetails", default)]
    pub plan_details: Vec<PlanDetail>,
    #[serde(rename = "ActualDetails", default)]
    pub actual_details: Vec<ActualDetail>,
    #[serde(rename = "Attachments", default)]
    pub attachments: Vec<Attachment>,
    /// Columns the client does not model; sent back as received.
    #[serde(flatten)]
    pub extra: Record,
}

impl ResourceGroup {
    /// Section records compared when resolving the mode flag.
    pub fn sections(&self) -> [(&'static str, &Record); 4] {
        [
            ("BasicDetails", &self.basic_details),
            ("OperationalDetails", &self.operational_details),
            ("BillingDetails", &self.billing_details),
            ("MoreRefDocs", &self.more_ref_docs),
        ]
    }
}

impl Entity for ResourceGroup {
    type Id = EntityId;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Tracked for ResourceGroup {
    fn mode_flag(&self) -> ModeFlag {
        self.mode_flag
    }

    fn set_mode_flag(&mut self, flag: ModeFlag) {
        self.mode_flag = flag;
    }
}

/// Section data for staging a new resource group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGroupDraft {
    pub basic_details: Record,
    pub operational_details: Record,
    pub billing_details: Record,
    pub more_ref_docs: Record,
}

impl ResourceGroupDraft {
    pub(crate) fn stage(self) -> ResourceGroup {
        ResourceGroup {
            id: EntityId::Staged,
            status: ResourceStatus::Fresh,
            mode_flag: ModeFlag::Insert,
            basic_details: self.basic_details,
            operational_details: self.operational_details,
            billing_details: self.billing_details,
            more_ref_docs: self.more_ref_docs,
            ..ResourceGroup::default()
        }
    }
}
