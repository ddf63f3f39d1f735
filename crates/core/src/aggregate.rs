//! Aggregate root trait.

use crate::mode_flag::ModeFlag;

/// Aggregate root marker + minimal interface.
///
/// The aggregate is the unit of submission: it is sent to the backend whole and
/// replaced whole by the canonical copy the backend returns.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Submission tag of the root itself.
    fn mode_flag(&self) -> ModeFlag;
}
