use quickorder_core::PanelId;
use quickorder_store::StoreError;
use thiserror::Error;

use crate::gate::EntityKey;

/// The request never completed or its payload could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unreadable response: {0}")]
    Parse(String),
}

impl TransportError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// One field that blocked a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub panel_id: PanelId,
    pub field_id: String,
    pub message: String,
}

/// Field-level problems across every panel of a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationIssues(pub Vec<FieldIssue>);

impl ValidationIssues {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, panel_id: &PanelId, field_id: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldIssue {
            panel_id: panel_id.clone(),
            field_id: field_id.into(),
            message: message.into(),
        });
    }

    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|issue| issue.message.as_str()).collect()
    }
}

impl core::fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    /// Local; the network was never touched.
    #[error("validation failed: {0}")]
    Validation(ValidationIssues),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request completed but the server refused the change.
    #[error("rejected by server: {message}")]
    BusinessRejection { message: String },

    #[error("a save for {0} is already in progress")]
    SaveInProgress(EntityKey),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The submit went through but the canonical copy could not be fetched.
    #[error("order {order_id} was saved but could not be reloaded: {reason}")]
    Reload { order_id: i64, reason: String },

    #[error("discarded stale response for order {0}")]
    Stale(i64),
}

impl SyncError {
    /// Whether staged inserts were undone because of this error.
    pub fn rolls_back(&self) -> bool {
        matches!(
            self,
            SyncError::Transport(_) | SyncError::BusinessRejection { .. } | SyncError::Reload { .. }
        )
    }

    /// Whether the user can fix this by editing and saving again.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::Validation(_) | SyncError::BusinessRejection { .. } | SyncError::SaveInProgress(_)
        )
    }
}
