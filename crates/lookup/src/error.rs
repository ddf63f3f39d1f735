use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The backing lookup call failed or returned an unusable payload.
    #[error("option source failed: {0}")]
    Source(String),
}

impl LookupError {
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }
}
