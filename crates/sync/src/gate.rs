//! One save at a time per entity.

use std::collections::HashSet;
use std::sync::Mutex;

use quickorder_core::EntityId;
use quickorder_store::{AttachmentOwner, LineKind};

use crate::error::SyncError;

/// The entity a save targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Header,
    ResourceGroup(EntityId),
    Line { kind: LineKind, resource_id: EntityId, line_id: EntityId },
    Attachments(AttachmentOwner),
}

impl core::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityKey::Header => f.write_str("order header"),
            EntityKey::ResourceGroup(id) => write!(f, "resource group {id}"),
            EntityKey::Line { kind, resource_id, line_id } => {
                write!(f, "{kind} line {line_id} of resource group {resource_id}")
            }
            EntityKey::Attachments(owner) => write!(f, "attachments of {owner}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct SaveGate {
    in_flight: Mutex<HashSet<EntityKey>>,
}

impl SaveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` until the returned permit is dropped.
    pub fn try_acquire(&self, key: EntityKey) -> Result<SavePermit<'_>, SyncError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(key.clone()) {
            return Err(SyncError::SaveInProgress(key));
        }
        Ok(SavePermit { gate: self, key })
    }

    pub fn is_busy(&self, key: &EntityKey) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

#[derive(Debug)]
pub struct SavePermit<'a> {
    gate: &'a SaveGate,
    key: EntityKey,
}

impl Drop for SavePermit<'_> {
    fn drop(&mut self) {
        self.gate
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_save_for_same_entity_is_rejected_until_release() {
        let gate = SaveGate::new();
        let key = EntityKey::ResourceGroup(EntityId::Assigned(41));

        let permit = gate.try_acquire(key.clone()).unwrap();
        assert!(matches!(gate.try_acquire(key.clone()), Err(SyncError::SaveInProgress(_))));
        assert!(gate.try_acquire(EntityKey::Header).is_ok());

        drop(permit);
        assert!(!gate.is_busy(&key));
        assert!(gate.try_acquire(key).is_ok());
    }
}
