use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Only one staged insert per collection may exist at a time.
    #[error("a staged {0} is already pending")]
    PendingInsertExists(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("a pending attachment '{name}' already exists in category '{category}'")]
    DuplicatePendingAttachment { category: String, name: String },
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}
