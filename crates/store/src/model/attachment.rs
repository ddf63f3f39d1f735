use quickorder_core::{Entity, EntityId, ModeFlag, Record, Tracked};
use serde::{Deserialize, Serialize};

/// A file attached to the order or to one resource group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "AttachItemID", default)]
    pub id: EntityId,
    /// Category (e.g. "Invoice", "Way bill").
    #[serde(rename = "AttachmentType", default)]
    pub category: String,
    /// Display name.
    #[serde(rename = "AttachName", default)]
    pub name: String,
    /// Storage name assigned by the file service.
    #[serde(rename = "AttachUniqueName", default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    #[serde(rename = "AttachRelPath", default, skip_serializing_if = "Option::is_none")]
    pub rel_path: Option<String>,
    #[serde(rename = "Remarks", default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(rename = "ModeFlag", default)]
    pub mode_flag: ModeFlag,
    #[serde(flatten)]
    pub extra: Record,
}

impl Attachment {
    pub fn is_pending(&self) -> bool {
        self.id.is_staged()
    }

    pub fn is_marked_deleted(&self) -> bool {
        self.mode_flag == ModeFlag::Delete
    }

    pub fn matches(&self, category: &str, name: &str) -> bool {
        self.category == category && self.name == name
    }
}

impl Entity for Attachment {
    type Id = EntityId;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Tracked for Attachment {
    fn mode_flag(&self) -> ModeFlag {
        self.mode_flag
    }

    fn set_mode_flag(&mut self, flag: ModeFlag) {
        self.mode_flag = flag;
    }
}

/// Input for staging a new attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAttachment {
    pub category: String,
    pub name: String,
    pub unique_name: Option<String>,
    pub rel_path: Option<String>,
    pub remarks: Option<String>,
}

impl NewAttachment {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn stored_as(mut self, unique_name: impl Into<String>, rel_path: impl Into<String>) -> Self {
        self.unique_name = Some(unique_name.into());
        self.rel_path = Some(rel_path.into());
        self
    }

    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub(crate) fn stage(self) -> Attachment {
        Attachment {
            id: EntityId::Staged,
            category: self.category,
            name: self.name,
            unique_name: self.unique_name,
            rel_path: self.rel_path,
            remarks: self.remarks,
            mode_flag: ModeFlag::Insert,
            extra: Record::new(),
        }
    }
}

/// Which attachment list is addressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttachmentOwner {
    Order,
    Resource(EntityId),
}

impl core::fmt::Display for AttachmentOwner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AttachmentOwner::Order => f.write_str("order"),
            AttachmentOwner::Resource(id) => write!(f, "resource {id}"),
        }
    }
}

/// How a caller names an attachment it wants removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentRef {
    /// A server-known attachment.
    Id(EntityId),
    /// A pending attachment, which has no server identity yet.
    Pending { category: String, name: String },
}

impl AttachmentRef {
    /// Address `attachment` the only way its lifecycle allows.
    pub fn of(attachment: &Attachment) -> Self {
        if attachment.is_pending() {
            AttachmentRef::Pending {
                category: attachment.category.clone(),
                name: attachment.name.clone(),
            }
        } else {
            AttachmentRef::Id(attachment.id)
        }
    }
}
