use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field is not editable: {0}")]
    ReadOnly(String),

    /// The personalization backend failed or returned an unusable payload.
    #[error("personalization failed: {0}")]
    Personalization(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PanelError {
    pub fn personalization(msg: impl Into<String>) -> Self {
        Self::Personalization(msg.into())
    }
}
