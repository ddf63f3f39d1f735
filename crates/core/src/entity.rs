//! Entity traits: identity + submission bookkeeping.

use crate::id::EntityId;
use crate::mode_flag::ModeFlag;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that travels inside the submitted aggregate.
///
/// Tracked entities are keyed by an [`EntityId`] that stays `Staged` until the
/// server confirms the insert, and carry the [`ModeFlag`] the backend uses to
/// apply them.
pub trait Tracked: Entity<Id = EntityId> {
    /// Returns the flag the next submit sends for this entity.
    fn mode_flag(&self) -> ModeFlag;

    /// Overwrites the submission flag.
    fn set_mode_flag(&mut self, flag: ModeFlag);

    /// Whether the server has not assigned an identifier yet.
    fn is_staged(&self) -> bool {
        self.id().is_staged()
    }
}

/// Find a tracked entity by identifier.
pub fn find_by_id<T: Tracked>(items: &[T], id: EntityId) -> Option<&T> {
    items.iter().find(|item| *item.id() == id)
}

/// Find a tracked entity by identifier (mutable).
pub fn find_by_id_mut<T: Tracked>(items: &mut [T], id: EntityId) -> Option<&mut T> {
    items.iter_mut().find(|item| *item.id() == id)
}

/// Remove every staged entity, returning how many were dropped.
pub fn remove_staged<T: Tracked>(items: &mut Vec<T>) -> usize {
    let before = items.len();
    items.retain(|item| !item.is_staged());
    before - items.len()
}
