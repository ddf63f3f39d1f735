use quickorder_core::{EntityId, ModeFlag, Record};

use crate::error::StoreResult;
use crate::model::{
    Attachment, AttachmentOwner, Line, LineDetails, LineKind, NewAttachment, QuickOrder,
    QuickOrderPatch, ResourceGroup, ResourceGroupDraft,
};
use crate::pending::{PendingChange, RollbackReport};

/// Addressed access to the one order aggregate held by the client.
///
/// Every mutation of the aggregate goes through these methods; readers get
/// owned copies. Implementations use interior mutability so one instance can
/// be shared behind an `Arc`.
pub trait OrderRepository: Send + Sync {
    // ---- order root ----

    fn quick_order(&self) -> StoreResult<QuickOrder>;

    fn set_quick_order(&self, patch: QuickOrderPatch) -> StoreResult<QuickOrder>;

    /// Overwrite the aggregate with the server's canonical copy. Resets the
    /// snapshot and the pending ledger.
    fn replace_with_server_copy(&self, order: QuickOrder) -> StoreResult<()>;

    /// Last server copy, if one was ever loaded.
    fn snapshot(&self) -> StoreResult<Option<QuickOrder>>;

    /// Bumped by every mutation.
    fn generation(&self) -> StoreResult<u64>;

    // ---- resource groups ----

    fn resource_group(&self, id: EntityId) -> StoreResult<Option<ResourceGroup>>;

    fn resource_groups(&self) -> StoreResult<Vec<ResourceGroup>>;

    /// Stage a new group (`Staged`, `Fresh`, `Insert`).
    fn push_resource_group(&self, draft: ResourceGroupDraft) -> StoreResult<ResourceGroup>;

    fn update_resource_group(
        &self,
        id: EntityId,
        basic: Record,
        operational: Record,
        billing: Record,
    ) -> StoreResult<ModeFlag>;

    fn update_more_ref_docs(&self, id: EntityId, more_ref_docs: Record) -> StoreResult<ModeFlag>;

    // ---- plan / actual lines ----

    fn line(&self, kind: LineKind, resource_id: EntityId, line_id: EntityId) -> StoreResult<Option<Line>>;

    fn lines(&self, kind: LineKind, resource_id: EntityId) -> StoreResult<Vec<Line>>;

    fn push_line(&self, kind: LineKind, resource_id: EntityId, details: LineDetails) -> StoreResult<Line>;

    fn update_line(
        &self,
        kind: LineKind,
        resource_id: EntityId,
        line_id: EntityId,
        details: LineDetails,
    ) -> StoreResult<ModeFlag>;

    /// Copy a plan into a new staged actual. A staged plan is moved instead.
    fn convert_plan_to_actual(&self, resource_id: EntityId, plan_line_id: EntityId) -> StoreResult<Line>;

    // ---- attachments ----

    fn attachments(&self, owner: AttachmentOwner) -> StoreResult<Vec<Attachment>>;

    fn push_attachment(&self, owner: AttachmentOwner, attachment: NewAttachment) -> StoreResult<Attachment>;

    /// Soft-delete a server-known attachment.
    fn mark_attachment_as_deleted(&self, owner: AttachmentOwner, id: EntityId) -> StoreResult<()>;

    /// Drop a pending attachment, which has no server id yet.
    fn mark_attachment_as_deleted_by_category_and_name(
        &self,
        owner: AttachmentOwner,
        category: &str,
        name: &str,
    ) -> StoreResult<()>;

    /// Hard-remove an attachment already marked `Delete`.
    fn delete_attachment_by_id(&self, owner: AttachmentOwner, id: EntityId) -> StoreResult<()>;

    // ---- pending ledger ----

    fn pending(&self) -> StoreResult<Vec<PendingChange>>;

    /// Remove every staged entity; committed entities are left untouched.
    fn rollback_pending(&self) -> StoreResult<RollbackReport>;
}
