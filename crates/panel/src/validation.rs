//! Type-aware mandatory-field checks.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::field::{FieldDescriptor, FieldKind, FieldValue};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d-%b-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p"];

/// Outcome of validating a panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Field id → message.
    pub errors: BTreeMap<String, String>,
    /// Mandatory fields without a usable value, in render order.
    pub mandatory_fields_empty: Vec<String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    pub(crate) fn reject(&mut self, field_id: &str, message: String) {
        self.is_valid = false;
        self.errors.insert(field_id.to_string(), message);
        self.mandatory_fields_empty.push(field_id.to_string());
    }

    /// Messages in field order, for a summary notification.
    pub fn messages(&self) -> Vec<String> {
        self.mandatory_fields_empty
            .iter()
            .filter_map(|id| self.errors.get(id).cloned())
            .collect()
    }
}

/// Message for a mandatory field that fails its type's emptiness rule, if any.
pub(crate) fn mandatory_violation(descriptor: &FieldDescriptor, value: &FieldValue) -> Option<String> {
    let label = &descriptor.label;
    match (&descriptor.kind, value) {
        (FieldKind::Card, _) => None,
        (FieldKind::InputDropdown { .. }, FieldValue::Pair { dropdown, input }) => {
            if dropdown.trim().is_empty() || input.trim().is_empty() {
                Some(format!("{label} requires both a unit and a value"))
            } else {
                None
            }
        }
        (FieldKind::InputDropdown { .. }, _) => Some(format!("{label} is required")),
        (FieldKind::Date, FieldValue::Text(s)) if !s.trim().is_empty() => {
            (!is_parseable_date(s)).then(|| format!("{label} is not a valid date"))
        }
        (FieldKind::Time, FieldValue::Text(s)) if !s.trim().is_empty() => {
            (!is_parseable_time(s)).then(|| format!("{label} is not a valid time"))
        }
        // "ID || Label" with an empty ID is still empty.
        (kind, FieldValue::Text(_)) if kind.is_lookup() => {
            value.lookup_id().is_none().then(|| format!("{label} is required"))
        }
        (FieldKind::LazySelect { multiple: true, .. }, FieldValue::Many(_)) if !value.is_blank() => None,
        (_, value) if value.is_blank() => Some(format!("{label} is required")),
        (FieldKind::Date | FieldKind::Time, _) => Some(format!("{label} is required")),
        (FieldKind::Text | FieldKind::Textarea | FieldKind::Search, FieldValue::Text(_)) => None,
        // A non-blank value of the wrong shape for the field type.
        (_, FieldValue::Pair { .. }) | (_, FieldValue::Many(_)) => Some(format!("{label} is required")),
        _ => None,
    }
}

fn is_parseable_date(s: &str) -> bool {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s).is_ok()
        || DATE_FORMATS.iter().any(|f| NaiveDate::parse_from_str(s, f).is_ok())
        || DATETIME_FORMATS.iter().any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
}

fn is_parseable_time(s: &str) -> bool {
    let s = s.trim();
    TIME_FORMATS.iter().any(|f| NaiveTime::parse_from_str(s, f).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width::FieldWidth;

    fn field(kind: FieldKind) -> FieldDescriptor {
        FieldDescriptor::new("Field", kind).mandatory().width(FieldWidth::Half)
    }

    #[test]
    fn input_dropdown_requires_both_parts() {
        let d = field(FieldKind::InputDropdown { options: vec![] });
        assert!(mandatory_violation(&d, &FieldValue::pair("A", "")).is_some());
        assert!(mandatory_violation(&d, &FieldValue::pair("", "4")).is_some());
        assert!(mandatory_violation(&d, &FieldValue::Empty).is_some());
        assert!(mandatory_violation(&d, &FieldValue::pair("A", "4")).is_none());
    }

    #[test]
    fn lookup_fields_need_an_identifier() {
        let d = field(FieldKind::Select { options: vec![] });
        assert!(mandatory_violation(&d, &FieldValue::text("  ")).is_some());
        assert!(mandatory_violation(&d, &FieldValue::text(" || Label")).is_some());
        assert!(mandatory_violation(&d, &FieldValue::text("C1 || North")).is_none());

        let multi = field(FieldKind::LazySelect { message_type: "Cluster Init".into(), multiple: true });
        assert!(mandatory_violation(&multi, &FieldValue::Many(vec![])).is_some());
        assert!(mandatory_violation(&multi, &FieldValue::Many(vec!["C1".into()])).is_none());
    }

    #[test]
    fn text_is_trimmed() {
        let d = field(FieldKind::Textarea);
        assert!(mandatory_violation(&d, &FieldValue::text(" \n ")).is_some());
        assert!(mandatory_violation(&d, &FieldValue::text("remarks")).is_none());
    }

    #[test]
    fn dates_and_times_must_parse() {
        let date = field(FieldKind::Date);
        assert!(mandatory_violation(&date, &FieldValue::text("2024-02-30")).is_some());
        assert!(mandatory_violation(&date, &FieldValue::text("2024-02-29")).is_none());
        assert!(mandatory_violation(&date, &FieldValue::text("29/02/2024")).is_none());
        assert!(mandatory_violation(&date, &FieldValue::text("2024-02-29T10:00:00Z")).is_none());
        assert!(mandatory_violation(&date, &FieldValue::Empty).is_some());

        let time = field(FieldKind::Time);
        assert!(mandatory_violation(&time, &FieldValue::text("25:00")).is_some());
        assert!(mandatory_violation(&time, &FieldValue::text("07:45")).is_none());
    }

    #[test]
    fn cards_are_never_checked() {
        let card = field(FieldKind::Card);
        assert!(mandatory_violation(&card, &FieldValue::Empty).is_none());
    }
}
