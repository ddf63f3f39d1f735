//! Per-entity submission tag.

use serde::{Deserialize, Serialize};

/// Tells the backend how to apply a submitted entity.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeFlag {
    Insert,
    Update,
    Delete,
    #[default]
    NoChange,
}

impl ModeFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeFlag::Insert => "Insert",
            ModeFlag::Update => "Update",
            ModeFlag::Delete => "Delete",
            ModeFlag::NoChange => "NoChange",
        }
    }

    /// Whether the backend has work to do for an entity carrying this flag.
    pub fn is_dirty(&self) -> bool {
        !matches!(self, ModeFlag::NoChange)
    }
}

impl core::fmt::Display for ModeFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
