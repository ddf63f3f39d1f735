//! Mode-flag resolution against the last server snapshot.

use quickorder_core::{EntityId, ModeFlag, Record};

/// Top-level keys whose values differ between `previous` and `next`,
/// including keys present on one side only.
pub fn shallow_diff(previous: &Record, next: &Record) -> Vec<String> {
    let mut changed: Vec<String> = next
        .iter()
        .filter(|(key, value)| previous.get(key) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect();
    changed.extend(
        previous
            .keys()
            .filter(|key| !next.contains_key(key))
            .cloned(),
    );
    changed.sort();
    changed
}

/// Flag for an entity after an edit.
///
/// `sections` pairs every section of the edited entity with the same section
/// of its snapshot copy (`None` when the entity is missing from the snapshot).
pub fn resolve_mode_flag<'a, I>(id: EntityId, sections: I) -> ModeFlag
where
    I: IntoIterator<Item = (Option<&'a Record>, &'a Record)>,
{
    if id.is_staged() {
        return ModeFlag::Insert;
    }
    let changed = sections.into_iter().any(|(previous, next)| match previous {
        Some(previous) => !shallow_diff(previous, next).is_empty(),
        None => true,
    });
    if changed { ModeFlag::Update } else { ModeFlag::NoChange }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn changed_value_flags_update() {
        let previous = record(json!({ "A": 1, "B": 2 }));
        let next = record(json!({ "A": 1, "B": 3 }));
        assert_eq!(shallow_diff(&previous, &next), vec!["B"]);
        assert_eq!(
            resolve_mode_flag(EntityId::Assigned(7), [(Some(&previous), &next)]),
            ModeFlag::Update
        );
    }

    #[test]
    fn identical_sections_keep_no_change() {
        let previous = record(json!({ "A": 1, "B": 2 }));
        let next = record(json!({ "A": 1, "B": 2 }));
        assert_eq!(
            resolve_mode_flag(EntityId::Assigned(7), [(Some(&previous), &next)]),
            ModeFlag::NoChange
        );
    }

    #[test]
    fn staged_entities_are_always_inserts() {
        let same = record(json!({ "A": 1 }));
        assert_eq!(
            resolve_mode_flag(EntityId::Staged, [(Some(&same), &same)]),
            ModeFlag::Insert
        );
    }

    #[test]
    fn removed_keys_count_as_changes() {
        let previous = record(json!({ "A": 1, "B": 2 }));
        let next = record(json!({ "A": 1 }));
        assert_eq!(shallow_diff(&previous, &next), vec!["B"]);
    }

    #[test]
    fn nested_changes_are_detected_at_top_level() {
        let previous = record(json!({ "Qty": { "dropdown": "KG", "input": "1" } }));
        let next = record(json!({ "Qty": { "dropdown": "KG", "input": "2" } }));
        assert_eq!(shallow_diff(&previous, &next), vec!["Qty"]);
    }

    proptest! {
        #[test]
        fn a_record_never_differs_from_itself(entries in proptest::collection::btree_map("[A-Z][a-z]{0,6}", any::<i64>(), 0..8)) {
            let rec: Record = entries.into_iter().map(|(k, v)| (k, json!(v))).collect();
            prop_assert!(shallow_diff(&rec, &rec).is_empty());
        }
    }
}
