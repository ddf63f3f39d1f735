use std::sync::RwLock;

use quickorder_core::entity::{find_by_id, find_by_id_mut, remove_staged};
use quickorder_core::{EntityId, ModeFlag, Record, Tracked};

use crate::diff::resolve_mode_flag;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    ActualDetail, Attachment, AttachmentOwner, Line, LineDetails, LineEntity, LineKind,
    NewAttachment, PlanDetail, QuickOrder, QuickOrderPatch, ResourceGroup, ResourceGroupDraft,
};
use crate::pending::{PendingChange, PendingLedger, PendingTarget, RollbackReport};
use crate::repository::OrderRepository;

#[derive(Debug, Default)]
struct StoreState {
    order: QuickOrder,
    snapshot: Option<QuickOrder>,
    ledger: PendingLedger,
    generation: u64,
}

impl StoreState {
    fn group(&self, id: EntityId) -> StoreResult<&ResourceGroup> {
        find_by_id(&self.order.resource_groups, id).ok_or_else(|| missing_group(id))
    }

    fn group_mut(&mut self, id: EntityId) -> StoreResult<&mut ResourceGroup> {
        find_by_id_mut(&mut self.order.resource_groups, id).ok_or_else(|| missing_group(id))
    }

    /// The live group plus its copy in the last server snapshot.
    fn group_with_snapshot(&mut self, id: EntityId) -> StoreResult<(&mut ResourceGroup, Option<&ResourceGroup>)> {
        let StoreState { order, snapshot, .. } = self;
        let previous = snapshot
            .as_ref()
            .and_then(|s| find_by_id(&s.resource_groups, id));
        let group = find_by_id_mut(&mut order.resource_groups, id).ok_or_else(|| missing_group(id))?;
        Ok((group, previous))
    }

    fn attachments(&self, owner: AttachmentOwner) -> StoreResult<&Vec<Attachment>> {
        match owner {
            AttachmentOwner::Order => Ok(&self.order.attachments),
            AttachmentOwner::Resource(id) => Ok(&self.group(id)?.attachments),
        }
    }

    fn attachments_mut(&mut self, owner: AttachmentOwner) -> StoreResult<&mut Vec<Attachment>> {
        match owner {
            AttachmentOwner::Order => Ok(&mut self.order.attachments),
            AttachmentOwner::Resource(id) => Ok(&mut self.group_mut(id)?.attachments),
        }
    }
}

fn missing_group(id: EntityId) -> StoreError {
    StoreError::not_found(format!("resource group {id}"))
}

fn missing_line(kind: LineKind, resource_id: EntityId, line_id: EntityId) -> StoreError {
    StoreError::not_found(format!("{kind} line {line_id} of resource group {resource_id}"))
}

fn group_flag(group: &ResourceGroup, previous: Option<&ResourceGroup>) -> ModeFlag {
    match previous {
        Some(previous) => resolve_mode_flag(
            group.id,
            previous
                .sections()
                .into_iter()
                .zip(group.sections())
                .map(|((_, before), (_, after))| (Some(before), after)),
        ),
        None => resolve_mode_flag(group.id, group.sections().into_iter().map(|(_, after)| (None, after))),
    }
}

fn line_flag(line: &LineDetails, id: EntityId, previous: Option<&LineDetails>) -> ModeFlag {
    match previous {
        Some(previous) => resolve_mode_flag(
            id,
            previous
                .sections()
                .into_iter()
                .zip(line.sections())
                .map(|((_, before), (_, after))| (Some(before), after)),
        ),
        None => resolve_mode_flag(id, line.sections().into_iter().map(|(_, after)| (None, after))),
    }
}

fn push_line_into<T: LineEntity>(items: &mut Vec<T>, details: LineDetails) -> StoreResult<Line> {
    if items.iter().any(|item| item.is_staged()) {
        return Err(StoreError::PendingInsertExists(format!("{} line", T::KIND)));
    }
    let line = T::staged(details);
    let view = line.to_line();
    items.push(line);
    Ok(view)
}

fn update_line_in<T: LineEntity>(
    items: &mut [T],
    previous: Option<&[T]>,
    resource_id: EntityId,
    line_id: EntityId,
    details: LineDetails,
) -> StoreResult<ModeFlag> {
    let before = previous
        .and_then(|lines| find_by_id(lines, line_id))
        .map(|line| line.details());
    let line = find_by_id_mut(items, line_id).ok_or_else(|| missing_line(T::KIND, resource_id, line_id))?;
    *line.details_mut() = details;
    let flag = line_flag(line.details(), line_id, before);
    line.set_mode_flag(flag);
    Ok(flag)
}

/// In-memory order store.
///
/// Holds exactly one aggregate, the last server snapshot used for diffing,
/// and the ledger of staged inserts.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    state: RwLock<StoreState>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a server copy.
    pub fn with_order(order: QuickOrder) -> Self {
        Self {
            state: RwLock::new(StoreState {
                order: order.clone(),
                snapshot: Some(order),
                ..StoreState::default()
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::invariant("lock poisoned"))?;
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::invariant("lock poisoned"))?;
        let out = f(&mut state)?;
        state.generation += 1;
        Ok(out)
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn quick_order(&self) -> StoreResult<QuickOrder> {
        self.read(|state| Ok(state.order.clone()))
    }

    fn set_quick_order(&self, patch: QuickOrderPatch) -> StoreResult<QuickOrder> {
        self.write(|state| {
            patch.apply(&mut state.order);
            Ok(state.order.clone())
        })
    }

    fn replace_with_server_copy(&self, order: QuickOrder) -> StoreResult<()> {
        self.write(|state| {
            tracing::debug!(
                order_id = %order.id,
                groups = order.resource_groups.len(),
                "store replaced with server copy"
            );
            state.order = order.clone();
            state.snapshot = Some(order);
            state.ledger.clear();
            Ok(())
        })
    }

    fn snapshot(&self) -> StoreResult<Option<QuickOrder>> {
        self.read(|state| Ok(state.snapshot.clone()))
    }

    fn generation(&self) -> StoreResult<u64> {
        self.read(|state| Ok(state.generation))
    }

    fn resource_group(&self, id: EntityId) -> StoreResult<Option<ResourceGroup>> {
        self.read(|state| Ok(find_by_id(&state.order.resource_groups, id).cloned()))
    }

    fn resource_groups(&self) -> StoreResult<Vec<ResourceGroup>> {
        self.read(|state| Ok(state.order.resource_groups.clone()))
    }

    fn push_resource_group(&self, draft: ResourceGroupDraft) -> StoreResult<ResourceGroup> {
        self.write(|state| {
            if state.order.resource_groups.iter().any(Tracked::is_staged) {
                return Err(StoreError::PendingInsertExists("resource group".to_string()));
            }
            let group = draft.stage();
            state.order.resource_groups.push(group.clone());
            state.ledger.record(PendingTarget::ResourceGroup);
            Ok(group)
        })
    }

    fn update_resource_group(
        &self,
        id: EntityId,
        basic: Record,
        operational: Record,
        billing: Record,
    ) -> StoreResult<ModeFlag> {
        self.write(|state| {
            let (group, previous) = state.group_with_snapshot(id)?;
            group.basic_details = basic;
            group.operational_details = operational;
            group.billing_details = billing;
            let flag = group_flag(group, previous);
            group.mode_flag = flag;
            Ok(flag)
        })
    }

    fn update_more_ref_docs(&self, id: EntityId, more_ref_docs: Record) -> StoreResult<ModeFlag> {
        self.write(|state| {
            let (group, previous) = state.group_with_snapshot(id)?;
            group.more_ref_docs = more_ref_docs;
            let flag = group_flag(group, previous);
            group.mode_flag = flag;
            Ok(flag)
        })
    }

    fn line(&self, kind: LineKind, resource_id: EntityId, line_id: EntityId) -> StoreResult<Option<Line>> {
        self.read(|state| {
            let group = state.group(resource_id)?;
            Ok(match kind {
                LineKind::Plan => find_by_id(&group.plan_details, line_id).map(Line::from),
                LineKind::Actual => find_by_id(&group.actual_details, line_id).map(Line::from),
            })
        })
    }

    fn lines(&self, kind: LineKind, resource_id: EntityId) -> StoreResult<Vec<Line>> {
        self.read(|state| {
            let group = state.group(resource_id)?;
            Ok(match kind {
                LineKind::Plan => group.plan_details.iter().map(Line::from).collect(),
                LineKind::Actual => group.actual_details.iter().map(Line::from).collect(),
            })
        })
    }

    fn push_line(&self, kind: LineKind, resource_id: EntityId, details: LineDetails) -> StoreResult<Line> {
        self.write(|state| {
            let group = state.group_mut(resource_id)?;
            let line = match kind {
                LineKind::Plan => push_line_into::<PlanDetail>(&mut group.plan_details, details)?,
                LineKind::Actual => push_line_into::<ActualDetail>(&mut group.actual_details, details)?,
            };
            state.ledger.record(PendingTarget::Line { kind, resource_id });
            Ok(line)
        })
    }

    fn update_line(
        &self,
        kind: LineKind,
        resource_id: EntityId,
        line_id: EntityId,
        details: LineDetails,
    ) -> StoreResult<ModeFlag> {
        self.write(|state| {
            let (group, previous) = state.group_with_snapshot(resource_id)?;
            match kind {
                LineKind::Plan => update_line_in(
                    &mut group.plan_details,
                    previous.map(|p| p.plan_details.as_slice()),
                    resource_id,
                    line_id,
                    details,
                ),
                LineKind::Actual => update_line_in(
                    &mut group.actual_details,
                    previous.map(|p| p.actual_details.as_slice()),
                    resource_id,
                    line_id,
                    details,
                ),
            }
        })
    }

    fn convert_plan_to_actual(&self, resource_id: EntityId, plan_line_id: EntityId) -> StoreResult<Line> {
        self.write(|state| {
            let group = state.group_mut(resource_id)?;
            if group.actual_details.iter().any(Tracked::is_staged) {
                return Err(StoreError::PendingInsertExists("actual line".to_string()));
            }
            let index = group
                .plan_details
                .iter()
                .position(|plan| plan.id == plan_line_id)
                .ok_or_else(|| missing_line(LineKind::Plan, resource_id, plan_line_id))?;

            let actual = if plan_line_id.is_staged() {
                // Never saved: the plan becomes the actual.
                ActualDetail::staged(group.plan_details.remove(index).details)
            } else {
                ActualDetail::staged(group.plan_details[index].details.clone())
            };
            let line = actual.to_line();
            group.actual_details.push(actual);

            let to = PendingTarget::Line { kind: LineKind::Actual, resource_id };
            if plan_line_id.is_staged() {
                let from = PendingTarget::Line { kind: LineKind::Plan, resource_id };
                state.ledger.retarget(&from, to);
            } else {
                state.ledger.record(to);
            }
            Ok(line)
        })
    }

    fn attachments(&self, owner: AttachmentOwner) -> StoreResult<Vec<Attachment>> {
        self.read(|state| Ok(state.attachments(owner)?.clone()))
    }

    fn push_attachment(&self, owner: AttachmentOwner, attachment: NewAttachment) -> StoreResult<Attachment> {
        self.write(|state| {
            let items = state.attachments_mut(owner)?;
            if items
                .iter()
                .any(|a| a.is_pending() && a.matches(&attachment.category, &attachment.name))
            {
                return Err(StoreError::DuplicatePendingAttachment {
                    category: attachment.category,
                    name: attachment.name,
                });
            }
            let staged = attachment.stage();
            items.push(staged.clone());
            state.ledger.record(PendingTarget::Attachment {
                owner,
                category: staged.category.clone(),
                name: staged.name.clone(),
            });
            Ok(staged)
        })
    }

    fn mark_attachment_as_deleted(&self, owner: AttachmentOwner, id: EntityId) -> StoreResult<()> {
        if id.is_staged() {
            return Err(StoreError::invariant(
                "a pending attachment has no server id; remove it by category and name",
            ));
        }
        self.write(|state| {
            let attachment = find_by_id_mut(state.attachments_mut(owner)?, id)
                .ok_or_else(|| StoreError::not_found(format!("attachment {id} of {owner}")))?;
            attachment.set_mode_flag(ModeFlag::Delete);
            Ok(())
        })
    }

    fn mark_attachment_as_deleted_by_category_and_name(
        &self,
        owner: AttachmentOwner,
        category: &str,
        name: &str,
    ) -> StoreResult<()> {
        self.write(|state| {
            let items = state.attachments_mut(owner)?;
            let index = items
                .iter()
                .position(|a| a.is_pending() && a.matches(category, name))
                .ok_or_else(|| StoreError::not_found(format!("pending attachment {category}/{name} of {owner}")))?;
            items.remove(index);
            state.ledger.forget(&PendingTarget::Attachment {
                owner,
                category: category.to_string(),
                name: name.to_string(),
            });
            Ok(())
        })
    }

    fn delete_attachment_by_id(&self, owner: AttachmentOwner, id: EntityId) -> StoreResult<()> {
        self.write(|state| {
            let items = state.attachments_mut(owner)?;
            let index = items
                .iter()
                .position(|a| a.id == id)
                .ok_or_else(|| StoreError::not_found(format!("attachment {id} of {owner}")))?;
            if !items[index].is_marked_deleted() {
                return Err(StoreError::invariant(format!(
                    "attachment {id} must be marked deleted before it is removed"
                )));
            }
            items.remove(index);
            Ok(())
        })
    }

    fn pending(&self) -> StoreResult<Vec<PendingChange>> {
        self.read(|state| Ok(state.ledger.entries().to_vec()))
    }

    fn rollback_pending(&self) -> StoreResult<RollbackReport> {
        self.write(|state| {
            let removed = state.ledger.take();
            let order = &mut state.order;

            let mut dropped = remove_staged(&mut order.resource_groups);
            dropped += remove_staged(&mut order.attachments);
            for group in &mut order.resource_groups {
                dropped += remove_staged(&mut group.plan_details);
                dropped += remove_staged(&mut group.actual_details);
                dropped += remove_staged(&mut group.attachments);
            }

            if dropped > 0 {
                tracing::warn!(entities = dropped, recorded = removed.len(), "rolled back staged entities");
            }
            Ok(RollbackReport { removed })
        })
    }
}
