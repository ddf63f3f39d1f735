//! Validate → write into the store → submit the aggregate → reload.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use quickorder_codec::{AmountDirection, DecimalLocale, convert_amount_field};
use quickorder_core::{EntityId, ModeFlag, PanelId, Record};
use quickorder_panel::PanelHandle;
use quickorder_store::{
    AttachmentOwner, AttachmentRef, Line, LineDetails, LineKind, NewAttachment, OrderRepository,
    QuickOrder, QuickOrderPatch, ResourceGroupDraft, StoreError,
};
use uuid::Uuid;

use crate::api::{QuickOrderApi, QuickOrderResponse, SubmitResult};
use crate::columns::ColumnMap;
use crate::error::{SyncError, TransportError, ValidationIssues};
use crate::gate::{EntityKey, SaveGate};

/// In-process settings of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Columns that hold amounts and go through decimal-locale conversion.
    pub amount_fields: BTreeSet<String>,
    pub locale: DecimalLocale,
}

impl SyncOptions {
    pub fn amount_field(mut self, column: impl Into<String>) -> Self {
        self.amount_fields.insert(column.into());
        self
    }

    pub fn locale(mut self, locale: DecimalLocale) -> Self {
        self.locale = locale;
        self
    }
}

/// Panels of one resource group.
#[derive(Clone, Copy)]
pub struct ResourceGroupPanels<'a> {
    pub basic: &'a dyn PanelHandle,
    pub operational: &'a dyn PanelHandle,
    pub billing: &'a dyn PanelHandle,
    pub more_ref_docs: Option<&'a dyn PanelHandle>,
}

impl<'a> ResourceGroupPanels<'a> {
    pub fn new(
        basic: &'a dyn PanelHandle,
        operational: &'a dyn PanelHandle,
        billing: &'a dyn PanelHandle,
    ) -> Self {
        Self {
            basic,
            operational,
            billing,
            more_ref_docs: None,
        }
    }

    pub fn with_more_ref_docs(mut self, panel: &'a dyn PanelHandle) -> Self {
        self.more_ref_docs = Some(panel);
        self
    }

    fn all(&self) -> Vec<&'a dyn PanelHandle> {
        let mut panels = vec![self.basic, self.operational, self.billing];
        panels.extend(self.more_ref_docs);
        panels
    }
}

/// Panels of one plan/actual line; sections without a panel keep their
/// stored columns.
#[derive(Clone, Copy, Default)]
pub struct LinePanels<'a> {
    pub wagon: Option<&'a dyn PanelHandle>,
    pub container: Option<&'a dyn PanelHandle>,
    pub product: Option<&'a dyn PanelHandle>,
    pub thu: Option<&'a dyn PanelHandle>,
    pub journey_and_scheduling: Option<&'a dyn PanelHandle>,
    pub other: Option<&'a dyn PanelHandle>,
}

impl<'a> LinePanels<'a> {
    fn all(&self) -> Vec<&'a dyn PanelHandle> {
        [
            self.wagon,
            self.container,
            self.product,
            self.thu,
            self.journey_and_scheduling,
            self.other,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Result of a save.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Submitted and the store now holds the server copy.
    Committed { order_id: i64 },
    /// Applied to the store only; nothing needed the server.
    StagedLocally,
}

/// Joins panels, the order store and the backend.
pub struct SyncCoordinator<R, A> {
    store: Arc<R>,
    api: Arc<A>,
    options: SyncOptions,
    columns: HashMap<PanelId, ColumnMap>,
    gate: SaveGate,
}

impl<R, A> SyncCoordinator<R, A>
where
    R: OrderRepository,
    A: QuickOrderApi,
{
    pub fn new(store: Arc<R>, api: Arc<A>) -> Self {
        Self {
            store,
            api,
            options: SyncOptions::default(),
            columns: HashMap::new(),
            gate: SaveGate::new(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the bindings derived from a panel's field kinds.
    pub fn with_columns(mut self, panel_id: impl Into<PanelId>, columns: ColumnMap) -> Self {
        self.columns.insert(panel_id.into(), columns);
        self
    }

    pub fn store(&self) -> &Arc<R> {
        &self.store
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn gate(&self) -> &SaveGate {
        &self.gate
    }

    pub(crate) fn columns_for(&self, panel: &dyn PanelHandle) -> ColumnMap {
        self.columns
            .get(panel.panel_id())
            .cloned()
            .unwrap_or_else(|| ColumnMap::for_panel(panel.config()))
    }

    // ---- loading ----

    /// Fetch an order and make it the store's content.
    ///
    /// The response is dropped if the store was mutated while it was in
    /// flight.
    pub async fn load_order(&self, order_id: i64) -> Result<QuickOrder, SyncError> {
        let generation = self.store.generation()?;
        let order = self.fetch_order(order_id).await?;
        if self.store.generation()? != generation {
            tracing::warn!(order_id, "store changed during load; discarding response");
            return Err(SyncError::Stale(order_id));
        }
        self.store.replace_with_server_copy(order.clone())?;
        tracing::info!(order_id, groups = order.resource_groups.len(), "order loaded");
        Ok(order)
    }

    /// Hydrate a panel from stored columns.
    pub fn seed_panel(&self, panel: &mut dyn PanelHandle, record: &Record) {
        let columns = self.columns_for(panel);
        let mut record = record.clone();
        for field in &self.options.amount_fields {
            let converted =
                convert_amount_field(&mut record, field, self.options.locale, AmountDirection::ToDisplay);
            if let Err(err) = converted {
                tracing::warn!(
                    panel = %panel.panel_id(),
                    field = %field,
                    error = %err,
                    "stored amount left unlocalized"
                );
            }
        }
        panel.set_form_values(columns.hydrate(&record));
    }

    // ---- saves ----

    pub async fn save_header(&self, panel: &dyn PanelHandle) -> Result<SaveOutcome, SyncError> {
        let _permit = self.gate.try_acquire(EntityKey::Header)?;
        validate_panels(&[panel])?;

        let order = self.store.quick_order()?;
        let header = self.section_record(&order.header, panel)?;
        self.store.set_quick_order(QuickOrderPatch::header(header))?;

        // The order only exists on the server once a resource group is saved.
        if order.is_staged() && order.resource_groups.is_empty() {
            return Ok(SaveOutcome::StagedLocally);
        }
        self.mark_root_dirty()?;
        self.submit_and_reload().await
    }

    /// Save the panels of a resource group. A staged id that is not in the
    /// store yet creates the group.
    pub async fn save_resource_group(
        &self,
        id: EntityId,
        panels: ResourceGroupPanels<'_>,
    ) -> Result<SaveOutcome, SyncError> {
        let _permit = self.gate.try_acquire(EntityKey::ResourceGroup(id))?;
        validate_panels(&panels.all())?;

        match self.store.resource_group(id)? {
            Some(existing) => {
                // Every section is converted before the store is touched.
                let basic = self.section_record(&existing.basic_details, panels.basic)?;
                let operational =
                    self.section_record(&existing.operational_details, panels.operational)?;
                let billing = self.section_record(&existing.billing_details, panels.billing)?;
                let more_ref_docs = panels
                    .more_ref_docs
                    .map(|panel| self.section_record(&existing.more_ref_docs, panel))
                    .transpose()?;
                let mut flag = self.store.update_resource_group(id, basic, operational, billing)?;
                if let Some(more_ref_docs) = more_ref_docs {
                    flag = self.store.update_more_ref_docs(id, more_ref_docs)?;
                }
                tracing::debug!(resource_id = %id, mode_flag = %flag, "resource group updated");
            }
            None if id.is_staged() => {
                let empty = Record::new();
                let draft = ResourceGroupDraft {
                    basic_details: self.section_record(&empty, panels.basic)?,
                    operational_details: self.section_record(&empty, panels.operational)?,
                    billing_details: self.section_record(&empty, panels.billing)?,
                    more_ref_docs: match panels.more_ref_docs {
                        Some(panel) => self.section_record(&empty, panel)?,
                        None => Record::new(),
                    },
                };
                self.store.push_resource_group(draft)?;
                tracing::debug!("resource group staged");
            }
            None => return Err(StoreError::not_found(format!("resource group {id}")).into()),
        }

        self.mark_root_dirty()?;
        self.submit_and_reload().await
    }

    /// Save a plan/actual line. A staged id that is not in the store yet
    /// creates the line.
    pub async fn save_line(
        &self,
        kind: LineKind,
        resource_id: EntityId,
        line_id: EntityId,
        panels: LinePanels<'_>,
    ) -> Result<SaveOutcome, SyncError> {
        let _permit = self.gate.try_acquire(EntityKey::Line { kind, resource_id, line_id })?;
        validate_panels(&panels.all())?;

        let existing = self.store.line(kind, resource_id, line_id)?;
        let mut details = existing.as_ref().map(|line| line.details.clone()).unwrap_or_default();
        self.fill_line(&mut details, &panels)?;

        match existing {
            Some(_) => {
                let flag = self.store.update_line(kind, resource_id, line_id, details)?;
                tracing::debug!(%kind, %resource_id, %line_id, mode_flag = %flag, "line updated");
            }
            None if line_id.is_staged() => {
                self.store.push_line(kind, resource_id, details)?;
                tracing::debug!(%kind, %resource_id, "line staged");
            }
            None => {
                let what = format!("{kind} line {line_id} of resource group {resource_id}");
                return Err(StoreError::not_found(what).into());
            }
        }

        self.mark_root_dirty()?;
        self.submit_and_reload().await
    }

    pub async fn convert_plan_to_actual(
        &self,
        resource_id: EntityId,
        plan_line_id: EntityId,
    ) -> Result<(Line, SaveOutcome), SyncError> {
        let _permit = self.gate.try_acquire(EntityKey::Line {
            kind: LineKind::Plan,
            resource_id,
            line_id: plan_line_id,
        })?;
        let actual = self.store.convert_plan_to_actual(resource_id, plan_line_id)?;
        self.mark_root_dirty()?;
        let outcome = self.submit_and_reload().await?;
        Ok((actual, outcome))
    }

    pub async fn save_attachment(
        &self,
        owner: AttachmentOwner,
        attachment: NewAttachment,
    ) -> Result<SaveOutcome, SyncError> {
        let _permit = self.gate.try_acquire(EntityKey::Attachments(owner))?;
        self.store.push_attachment(owner, attachment)?;
        self.mark_root_dirty()?;
        self.submit_and_reload().await
    }

    /// Server-known attachments are soft-deleted and submitted; pending ones
    /// are dropped locally.
    pub async fn delete_attachment(
        &self,
        owner: AttachmentOwner,
        target: AttachmentRef,
    ) -> Result<SaveOutcome, SyncError> {
        let _permit = self.gate.try_acquire(EntityKey::Attachments(owner))?;
        match target {
            AttachmentRef::Pending { category, name } => {
                self.store
                    .mark_attachment_as_deleted_by_category_and_name(owner, &category, &name)?;
                Ok(SaveOutcome::StagedLocally)
            }
            AttachmentRef::Id(id) => {
                self.store.mark_attachment_as_deleted(owner, id)?;
                self.mark_root_dirty()?;
                self.submit_and_reload().await
            }
        }
    }

    // ---- internals ----

    /// Stored section overlaid with a panel's flattened values.
    fn section_record(
        &self,
        stored: &Record,
        panel: &dyn PanelHandle,
    ) -> Result<Record, SyncError> {
        let mut flat = self.columns_for(panel).flatten(&panel.form_values());
        let mut issues = ValidationIssues::default();
        for field in &self.options.amount_fields {
            let converted =
                convert_amount_field(&mut flat, field, self.options.locale, AmountDirection::ToBackend);
            if let Err(err) = converted {
                issues.push(panel.panel_id(), field.as_str(), err.to_string());
            }
        }
        if !issues.is_empty() {
            return Err(SyncError::Validation(issues));
        }
        let mut record = stored.clone();
        record.merge(flat);
        Ok(record)
    }

    fn fill_line(&self, details: &mut LineDetails, panels: &LinePanels<'_>) -> Result<(), SyncError> {
        let sections: [(&mut Record, Option<&dyn PanelHandle>); 6] = [
            (&mut details.wagon_details, panels.wagon),
            (&mut details.container_details, panels.container),
            (&mut details.product_details, panels.product),
            (&mut details.thu_details, panels.thu),
            (&mut details.journey_and_scheduling_details, panels.journey_and_scheduling),
            (&mut details.other_details, panels.other),
        ];
        for (section, panel) in sections {
            if let Some(panel) = panel {
                *section = self.section_record(section, panel)?;
            }
        }
        Ok(())
    }

    fn mark_root_dirty(&self) -> Result<(), SyncError> {
        let order = self.store.quick_order()?;
        let flag = if order.is_staged() { ModeFlag::Insert } else { ModeFlag::Update };
        self.store.set_quick_order(QuickOrderPatch::default().mode_flag(flag))?;
        Ok(())
    }

    pub(crate) async fn fetch_order(&self, order_id: i64) -> Result<QuickOrder, SyncError> {
        let envelope = self.api.get_quick_order(order_id).await?;
        let response: QuickOrderResponse = envelope.parse()?;
        response
            .response_result
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::parse(format!("no order in response for {order_id}")).into())
    }

    /// Submit the whole aggregate, then replace the store with the server
    /// copy. Any failure before the server accepted the order rolls back the
    /// staged inserts.
    pub(crate) async fn submit_and_reload(&self) -> Result<SaveOutcome, SyncError> {
        let order = self.store.quick_order()?;
        let correlation_id = Uuid::now_v7();
        tracing::info!(
            %correlation_id,
            order_id = %order.id,
            groups = order.resource_groups.len(),
            "submitting order"
        );

        let envelope = match self.api.update_quick_order_resource(&order).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(%correlation_id, error = %err, "submit failed");
                self.roll_back(correlation_id);
                return Err(err.into());
            }
        };

        let order_id = match accepted_order_id(&envelope, &order) {
            Ok(order_id) => order_id,
            Err(err) => {
                tracing::warn!(%correlation_id, error = %err, "submit not accepted");
                self.roll_back(correlation_id);
                return Err(err);
            }
        };

        let reloaded = match self.fetch_order(order_id).await {
            Ok(copy) if copy.id == EntityId::Assigned(order_id) => Ok(copy),
            Ok(copy) => Err(format!("reload returned order {}", copy.id)),
            Err(err) => Err(err.to_string()),
        };
        match reloaded {
            Ok(copy) => {
                self.store.replace_with_server_copy(copy)?;
                tracing::info!(%correlation_id, order_id, "order committed and reloaded");
                Ok(SaveOutcome::Committed { order_id })
            }
            Err(reason) => {
                tracing::error!(%correlation_id, order_id, %reason, "reload after submit failed");
                // The server holds the staged rows now; the next load brings them back.
                self.store.set_quick_order(QuickOrderPatch {
                    id: Some(EntityId::Assigned(order_id)),
                    ..QuickOrderPatch::default()
                })?;
                self.roll_back(correlation_id);
                Err(SyncError::Reload { order_id, reason })
            }
        }
    }

    fn roll_back(&self, correlation_id: Uuid) {
        match self.store.rollback_pending() {
            Ok(report) => {
                tracing::warn!(%correlation_id, removed = report.removed.len(), "staged changes rolled back");
            }
            Err(err) => {
                tracing::error!(%correlation_id, error = %err, "rollback failed");
            }
        }
    }
}

/// Validate every panel; collect all failures.
fn validate_panels(panels: &[&dyn PanelHandle]) -> Result<(), SyncError> {
    let mut issues = ValidationIssues::default();
    for panel in panels {
        let report = panel.validate();
        for field_id in &report.mandatory_fields_empty {
            let message = report.errors.get(field_id).cloned().unwrap_or_default();
            issues.push(panel.panel_id(), field_id.as_str(), message);
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Validation(issues))
    }
}

/// Order id the server confirmed, or why the submit was not accepted.
fn accepted_order_id(
    envelope: &crate::api::ApiEnvelope,
    submitted: &QuickOrder,
) -> Result<i64, SyncError> {
    let rows: Vec<SubmitResult> = match envelope.parse() {
        Ok(rows) => rows,
        Err(err) if envelope.reported_failure() => {
            return Err(SyncError::BusinessRejection {
                message: envelope.message.clone().unwrap_or_else(|| err.to_string()),
            });
        }
        Err(err) => return Err(err.into()),
    };
    let first = rows
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::parse("empty submit result"))?;
    if !first.is_success() {
        let message = first
            .error_msg
            .filter(|m| !m.trim().is_empty())
            .or_else(|| envelope.message.clone())
            .unwrap_or_else(|| format!("status '{}'", first.status));
        return Err(SyncError::BusinessRejection { message });
    }
    first
        .quick_unique_id
        .server_id()
        .or_else(|| submitted.id.server_id())
        .ok_or_else(|| TransportError::parse("submit result carries no order id").into())
}
