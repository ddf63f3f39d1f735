//! Ledger of staged inserts awaiting server confirmation.

use chrono::{DateTime, Utc};
use quickorder_core::EntityId;

use crate::model::{AttachmentOwner, LineKind};

/// What was staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingTarget {
    ResourceGroup,
    Line { kind: LineKind, resource_id: EntityId },
    Attachment { owner: AttachmentOwner, category: String, name: String },
}

impl core::fmt::Display for PendingTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PendingTarget::ResourceGroup => f.write_str("resource group"),
            PendingTarget::Line { kind, resource_id } => write!(f, "{kind} line of resource {resource_id}"),
            PendingTarget::Attachment { owner, category, name } => {
                write!(f, "attachment {category}/{name} of {owner}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub target: PendingTarget,
    pub staged_at: DateTime<Utc>,
}

/// Outcome of a rollback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub removed: Vec<PendingChange>,
}

impl RollbackReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PendingLedger {
    entries: Vec<PendingChange>,
}

impl PendingLedger {
    pub(crate) fn record(&mut self, target: PendingTarget) {
        self.entries.push(PendingChange {
            target,
            staged_at: Utc::now(),
        });
    }

    pub(crate) fn entries(&self) -> &[PendingChange] {
        &self.entries
    }

    pub(crate) fn forget(&mut self, target: &PendingTarget) {
        self.entries.retain(|entry| entry.target != *target);
    }

    /// Re-point an entry (a staged plan converted in place into an actual).
    pub(crate) fn retarget(&mut self, from: &PendingTarget, to: PendingTarget) {
        match self.entries.iter_mut().find(|entry| entry.target == *from) {
            Some(entry) => entry.target = to,
            None => self.record(to),
        }
    }

    pub(crate) fn take(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
