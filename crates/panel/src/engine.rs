//! Panel state: values, effective layout and validation.

use std::collections::BTreeMap;

use quickorder_core::{PanelId, UserId};
use serde::Serialize;

use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::field::{FieldDescriptor, FieldKind, FieldValue};
use crate::personalization::{FieldSettings, PanelSettings, PersonalizationStore};
use crate::validation::{ValidationReport, mandatory_violation};
use crate::width::{FieldWidth, Placement, layout_rows};

/// Field id → current value.
pub type FormValues = BTreeMap<String, FieldValue>;

/// A field with the user's layout override applied.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedField<'a> {
    pub id: &'a str,
    pub descriptor: &'a FieldDescriptor,
    pub visible: bool,
    pub order: i32,
    pub width: FieldWidth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCell {
    pub field_id: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    pub editable: bool,
    pub mandatory: bool,
    pub column_start: u8,
    pub span: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// View model of a panel: grid rows of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPanel {
    pub panel_id: PanelId,
    pub title: String,
    pub collapsible: bool,
    pub rows: Vec<Vec<RenderedCell>>,
}

/// Identifies one personalization load; only the latest one may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Imperative access used by whoever drives the panel (the sync coordinator).
pub trait PanelHandle: Send + Sync {
    fn panel_id(&self) -> &PanelId;

    fn config(&self) -> &PanelConfig;

    fn validate(&self) -> ValidationReport;

    fn form_values(&self) -> FormValues;

    /// Merge values in; ids the panel does not declare are ignored.
    fn set_form_values(&mut self, values: FormValues);
}

#[derive(Debug, Clone)]
pub struct PanelEngine {
    defaults: PanelConfig,
    overrides: PanelSettings,
    values: FormValues,
    load_generation: u64,
}

impl PanelEngine {
    pub fn new(config: PanelConfig) -> Self {
        let values = config
            .fields
            .iter()
            .map(|(id, d)| (id.clone(), d.value.clone()))
            .collect();
        Self {
            defaults: config,
            overrides: PanelSettings::default(),
            values,
            load_generation: 0,
        }
    }

    pub fn title(&self) -> &str {
        self.overrides.title.as_deref().unwrap_or(&self.defaults.title)
    }

    pub fn collapsible(&self) -> bool {
        self.overrides.collapsible.unwrap_or(self.defaults.collapsible)
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    /// Every field (hidden ones included) in render order: `order`
    /// ascending, ties broken by field id.
    pub fn resolved_fields(&self) -> Vec<ResolvedField<'_>> {
        let mut fields: Vec<ResolvedField<'_>> = self
            .defaults
            .fields
            .iter()
            .map(|(id, descriptor)| {
                let over = self.overrides.field(id);
                ResolvedField {
                    id,
                    descriptor,
                    visible: over.and_then(|o| o.visible).unwrap_or(descriptor.visible),
                    order: over.and_then(|o| o.order).unwrap_or(descriptor.order),
                    width: over.and_then(|o| o.width).unwrap_or(descriptor.width),
                }
            })
            .collect();
        // BTreeMap iteration already orders by id, so a stable sort keeps ties by id.
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn visible_fields(&self) -> Vec<ResolvedField<'_>> {
        self.resolved_fields().into_iter().filter(|f| f.visible).collect()
    }

    pub fn layout(&self) -> Vec<Vec<Placement>> {
        layout_rows(self.visible_fields().iter().map(|f| (f.id, f.width)))
    }

    /// Build the view model, attaching messages from `report` when given.
    pub fn render(&self, report: Option<&ValidationReport>) -> RenderedPanel {
        let rows = self
            .layout()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .filter_map(|placement| self.render_cell(placement, report))
                    .collect()
            })
            .collect();
        RenderedPanel {
            panel_id: self.defaults.panel_id.clone(),
            title: self.title().to_string(),
            collapsible: self.collapsible(),
            rows,
        }
    }

    fn render_cell(&self, placement: Placement, report: Option<&ValidationReport>) -> Option<RenderedCell> {
        let descriptor = self.defaults.descriptor(&placement.field_id)?;
        Some(RenderedCell {
            label: descriptor.label.clone(),
            kind: descriptor.kind.clone(),
            value: self.values.get(&placement.field_id).cloned().unwrap_or_default(),
            editable: descriptor.editable,
            mandatory: descriptor.mandatory,
            column_start: placement.column_start,
            span: placement.span,
            error: report.and_then(|r| r.errors.get(&placement.field_id).cloned()),
            field_id: placement.field_id,
        })
    }

    /// Check every visible mandatory field. Does not touch state.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::valid();
        for field in self.visible_fields() {
            if !field.descriptor.mandatory {
                continue;
            }
            let value = self.values.get(field.id).cloned().unwrap_or_default();
            if let Some(message) = mandatory_violation(field.descriptor, &value) {
                report.reject(field.id, message);
            }
        }
        report
    }

    /// User edit of one field. Fires the field's change hook.
    pub fn set_value(&mut self, field_id: &str, value: FieldValue) -> Result<(), PanelError> {
        let descriptor = self
            .defaults
            .descriptor(field_id)
            .ok_or_else(|| PanelError::UnknownField(field_id.to_string()))?;
        if !descriptor.editable {
            return Err(PanelError::ReadOnly(field_id.to_string()));
        }
        descriptor.events.fire_change(field_id, &value);
        self.values.insert(field_id.to_string(), value);
        Ok(())
    }

    /// Programmatic merge of values (hydration from the store). Unknown ids
    /// are ignored and no change hooks fire.
    pub fn set_form_values(&mut self, values: FormValues) {
        for (id, value) in values {
            if self.defaults.fields.contains_key(&id) {
                self.values.insert(id, value);
            } else {
                tracing::debug!(panel = %self.defaults.panel_id, field = %id, "ignoring value for unknown field");
            }
        }
    }

    pub fn form_values(&self) -> FormValues {
        self.values.clone()
    }

    /// Replace the layout override. Settings are merged onto the default
    /// config, so applying the same settings twice is a no-op.
    pub fn apply_settings(&mut self, settings: PanelSettings) {
        let fields = settings
            .fields
            .into_iter()
            .filter(|(id, over)| self.defaults.fields.contains_key(id) && !over.is_empty())
            .collect();
        self.overrides = PanelSettings {
            title: settings.title,
            collapsible: settings.collapsible,
            fields,
        };
    }

    /// The complete effective layout, suitable for saving.
    pub fn current_settings(&self) -> PanelSettings {
        let fields = self
            .resolved_fields()
            .into_iter()
            .map(|f| {
                (
                    f.id.to_string(),
                    FieldSettings {
                        visible: Some(f.visible),
                        order: Some(f.order),
                        width: Some(f.width),
                    },
                )
            })
            .collect();
        PanelSettings {
            title: Some(self.title().to_string()),
            collapsible: Some(self.collapsible()),
            fields,
        }
    }

    pub fn set_field_visible(&mut self, field_id: &str, visible: bool) -> Result<(), PanelError> {
        self.ensure_known(field_id)?;
        self.overrides.field_mut(field_id).visible = Some(visible);
        Ok(())
    }

    pub fn set_field_width(&mut self, field_id: &str, width: FieldWidth) -> Result<(), PanelError> {
        self.ensure_known(field_id)?;
        self.overrides.field_mut(field_id).width = Some(width);
        Ok(())
    }

    /// Move a field to `position` in render order (clamped to the end) and
    /// renumber every field.
    pub fn move_field(&mut self, field_id: &str, position: usize) -> Result<(), PanelError> {
        self.ensure_known(field_id)?;
        let mut ids: Vec<String> = self
            .resolved_fields()
            .into_iter()
            .map(|f| f.id.to_string())
            .filter(|id| id != field_id)
            .collect();
        ids.insert(position.min(ids.len()), field_id.to_string());
        for (index, id) in ids.iter().enumerate() {
            self.overrides.field_mut(id).order = Some(slot_order(index));
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.overrides.title = Some(title.into());
    }

    pub fn set_collapsible(&mut self, collapsible: bool) {
        self.overrides.collapsible = Some(collapsible);
    }

    /// Drop every layout override. Values are kept.
    pub fn reset_layout(&mut self) {
        self.overrides = PanelSettings::default();
    }

    /// Start a personalization load, superseding any earlier one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
        }
    }

    /// Apply loaded settings if `ticket` is still current. Returns whether
    /// anything was applied.
    pub fn finish_load(&mut self, ticket: LoadTicket, settings: Option<PanelSettings>) -> bool {
        if ticket.generation != self.load_generation {
            tracing::warn!(
                panel = %self.defaults.panel_id,
                ticket = ticket.generation,
                current = self.load_generation,
                "discarding stale personalization"
            );
            return false;
        }
        match settings {
            Some(settings) => {
                self.apply_settings(settings);
                true
            }
            None => false,
        }
    }

    pub async fn load_personalization<S>(&mut self, store: &S, user_id: &UserId) -> Result<bool, PanelError>
    where
        S: PersonalizationStore + ?Sized,
    {
        let ticket = self.begin_load();
        let panel_id = self.defaults.panel_id.clone();
        let settings = store.get_user_panel_config(user_id, &panel_id).await?;
        tracing::debug!(panel = %panel_id, found = settings.is_some(), "personalization loaded");
        Ok(self.finish_load(ticket, settings))
    }

    pub async fn save_personalization<S>(&self, store: &S, user_id: &UserId) -> Result<(), PanelError>
    where
        S: PersonalizationStore + ?Sized,
    {
        let settings = self.current_settings();
        store
            .save_user_panel_config(user_id, &self.defaults.panel_id, &settings)
            .await
    }

    fn ensure_known(&self, field_id: &str) -> Result<(), PanelError> {
        if self.defaults.fields.contains_key(field_id) {
            Ok(())
        } else {
            Err(PanelError::UnknownField(field_id.to_string()))
        }
    }
}

fn slot_order(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

impl PanelHandle for PanelEngine {
    fn panel_id(&self) -> &PanelId {
        &self.defaults.panel_id
    }

    fn config(&self) -> &PanelConfig {
        &self.defaults
    }

    fn validate(&self) -> ValidationReport {
        PanelEngine::validate(self)
    }

    fn form_values(&self) -> FormValues {
        PanelEngine::form_values(self)
    }

    fn set_form_values(&mut self, values: FormValues) {
        PanelEngine::set_form_values(self, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldEvents;
    use async_trait::async_trait;
    use quickorder_lookup::LookupOption;
    use std::sync::{Arc, Mutex};

    fn billing_panel() -> PanelConfig {
        PanelConfig::new("billing-details", "Billing Details")
            .field(
                "Tariff",
                FieldDescriptor::new("Tariff", FieldKind::LazySelect { message_type: "Tariff Init".into(), multiple: false })
                    .mandatory()
                    .width(FieldWidth::Half)
                    .order(1),
            )
            .field(
                "Qty",
                FieldDescriptor::new("Quantity", FieldKind::InputDropdown { options: vec![LookupOption::new("KG", "Kilogram")] })
                    .mandatory()
                    .width(FieldWidth::Half)
                    .order(2),
            )
            .field(
                "Remarks",
                FieldDescriptor::new("Remarks", FieldKind::Textarea).mandatory().order(3),
            )
            .field(
                "Summary",
                FieldDescriptor::new("Summary", FieldKind::Card).read_only().order(0),
            )
    }

    #[test]
    fn empty_mandatory_fields_are_reported_in_order() {
        let mut panel = PanelEngine::new(billing_panel());
        panel.set_value("Qty", FieldValue::pair("A", "")).unwrap();

        let report = panel.validate();
        assert!(!report.is_valid);
        assert_eq!(report.mandatory_fields_empty, vec!["Tariff", "Qty", "Remarks"]);
        assert!(report.errors["Remarks"].contains("Remarks"));
    }

    #[test]
    fn filled_panel_is_valid_and_hidden_fields_are_skipped() {
        let mut panel = PanelEngine::new(billing_panel());
        panel.set_value("Tariff", FieldValue::text("T1 || Flat rate")).unwrap();
        panel.set_value("Qty", FieldValue::pair("KG", "12")).unwrap();
        panel.set_field_visible("Remarks", false).unwrap();

        assert!(panel.validate().is_valid);
    }

    #[test]
    fn render_orders_and_places_cells() {
        let panel = PanelEngine::new(billing_panel());
        let rendered = panel.render(Some(&panel.validate()));

        let ids: Vec<Vec<&str>> = rendered
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.field_id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["Summary"], vec!["Tariff", "Qty"], vec!["Remarks"]]);
        assert_eq!(rendered.rows[1][1].column_start, 7);
        assert!(rendered.rows[1][0].error.is_some());
        assert!(rendered.rows[0][0].error.is_none());
    }

    #[test]
    fn set_value_rejects_unknown_and_read_only_fields() {
        let mut panel = PanelEngine::new(billing_panel());
        assert!(matches!(
            panel.set_value("Nope", FieldValue::text("x")),
            Err(PanelError::UnknownField(_))
        ));
        assert!(matches!(
            panel.set_value("Summary", FieldValue::text("x")),
            Err(PanelError::ReadOnly(_))
        ));
    }

    #[test]
    fn change_hook_fires_on_user_edits_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = PanelConfig::new("p", "P").field(
            "Remarks",
            FieldDescriptor::new("Remarks", FieldKind::Text).events(FieldEvents::on_change(move |id, value| {
                sink.lock().unwrap().push((id.to_string(), value.clone()));
            })),
        );
        let mut panel = PanelEngine::new(config);

        panel.set_value("Remarks", FieldValue::text("urgent")).unwrap();
        panel.set_form_values(FormValues::from([("Remarks".to_string(), FieldValue::text("seeded"))]));

        assert_eq!(*seen.lock().unwrap(), vec![("Remarks".to_string(), FieldValue::text("urgent"))]);
        assert_eq!(panel.value("Remarks"), Some(&FieldValue::text("seeded")));
    }

    #[test]
    fn set_form_values_merges_and_ignores_unknown_ids() {
        let mut panel = PanelEngine::new(billing_panel());
        panel.set_value("Remarks", FieldValue::text("keep")).unwrap();
        panel.set_form_values(FormValues::from([
            ("Tariff".to_string(), FieldValue::text("T1")),
            ("Ghost".to_string(), FieldValue::text("boo")),
        ]));

        let values = panel.form_values();
        assert_eq!(values["Remarks"], FieldValue::text("keep"));
        assert_eq!(values["Tariff"], FieldValue::text("T1"));
        assert!(!values.contains_key("Ghost"));
    }

    #[test]
    fn applying_settings_twice_is_idempotent() {
        let mut panel = PanelEngine::new(billing_panel());
        let mut settings = PanelSettings {
            title: Some("Mine".into()),
            ..PanelSettings::default()
        };
        settings.fields.insert(
            "Remarks".into(),
            FieldSettings { visible: None, order: Some(-1), width: Some(FieldWidth::Third) },
        );
        settings.fields.insert("Ghost".into(), FieldSettings { visible: Some(false), ..Default::default() });

        panel.apply_settings(settings.clone());
        let once = panel.current_settings();
        panel.apply_settings(settings);
        assert_eq!(panel.current_settings(), once);

        assert_eq!(panel.title(), "Mine");
        assert_eq!(panel.visible_fields()[0].id, "Remarks");
        assert!(!once.fields.contains_key("Ghost"));
    }

    #[test]
    fn current_settings_round_trip_onto_a_fresh_engine() {
        let mut edited = PanelEngine::new(billing_panel());
        edited.move_field("Remarks", 0).unwrap();
        edited.set_field_width("Tariff", FieldWidth::Quarter).unwrap();
        edited.set_collapsible(true);

        let mut fresh = PanelEngine::new(billing_panel());
        fresh.apply_settings(edited.current_settings());
        assert_eq!(fresh.current_settings(), edited.current_settings());
        assert_eq!(fresh.layout(), edited.layout());
        assert!(fresh.collapsible());
    }

    #[test]
    fn move_field_reorders_and_reset_restores_defaults() {
        let mut panel = PanelEngine::new(billing_panel());
        panel.move_field("Summary", 99).unwrap();
        let ids: Vec<&str> = panel.resolved_fields().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["Tariff", "Qty", "Remarks", "Summary"]);

        panel.reset_layout();
        let ids: Vec<&str> = panel.resolved_fields().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["Summary", "Tariff", "Qty", "Remarks"]);
    }

    #[test]
    fn stale_load_ticket_is_dropped() {
        let mut panel = PanelEngine::new(billing_panel());
        let first = panel.begin_load();
        let second = panel.begin_load();

        let late = PanelSettings { title: Some("Late".into()), ..PanelSettings::default() };
        assert!(!panel.finish_load(first, Some(late)));
        assert_eq!(panel.title(), "Billing Details");

        let current = PanelSettings { title: Some("Current".into()), ..PanelSettings::default() };
        assert!(panel.finish_load(second, Some(current)));
        assert_eq!(panel.title(), "Current");
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<PanelSettings>>,
    }

    #[async_trait]
    impl PersonalizationStore for MemoryStore {
        async fn get_user_panel_config(
            &self,
            _user_id: &UserId,
            _panel_id: &PanelId,
        ) -> Result<Option<PanelSettings>, PanelError> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save_user_panel_config(
            &self,
            _user_id: &UserId,
            _panel_id: &PanelId,
            settings: &PanelSettings,
        ) -> Result<(), PanelError> {
            *self.saved.lock().unwrap() = Some(settings.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn personalization_saves_and_loads_through_a_store() {
        let store = MemoryStore::default();
        let user = UserId::new("u1");

        let mut editor = PanelEngine::new(billing_panel());
        editor.set_field_visible("Remarks", false).unwrap();
        editor.save_personalization(&store, &user).await.unwrap();

        let mut reader = PanelEngine::new(billing_panel());
        assert!(reader.load_personalization(&store, &user).await.unwrap());
        assert!(reader.visible_fields().iter().all(|f| f.id != "Remarks"));
    }
}
