//! Order document store.
//!
//! Holds the single `QuickOrder` aggregate edited by the client, resolves
//! per-entity mode flags against the last server snapshot, and keeps a ledger
//! of staged inserts so a failed submit can be rolled back in one call.

pub mod diff;
pub mod error;
pub mod in_memory;
pub mod model;
pub mod pending;
pub mod repository;

pub use diff::{resolve_mode_flag, shallow_diff};
pub use error::{StoreError, StoreResult};
pub use in_memory::InMemoryOrderRepository;
pub use model::{
    ActualDetail, Attachment, AttachmentOwner, AttachmentRef, Line, LineDetails, LineEntity,
    LineKind, NewAttachment, OrderType, PlanDetail, QuickOrder, QuickOrderPatch, ResourceGroup,
    ResourceGroupDraft, ResourceStatus,
};
pub use pending::{PendingChange, PendingTarget, RollbackReport};
pub use repository::OrderRepository;
