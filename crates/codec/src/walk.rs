//! Recursive application of the composite transforms over JSON payloads.

use serde_json::{Map, Value};

use crate::composite::split_composite;

/// `{dropdown, input}`: a unit/value pair such as quantity + UOM.
pub fn is_measured_pair(map: &Map<String, Value>) -> bool {
    map.len() == 2 && map.contains_key("dropdown") && map.contains_key("input")
}

/// `{value, label}`: a display string that has already been split.
pub fn is_lookup_pair(map: &Map<String, Value>) -> bool {
    map.len() == 2 && map.contains_key("value") && map.contains_key("label")
}

/// Replace every composite string with a `{value, label}` object.
///
/// Objects and arrays are walked; in `{dropdown, input}` pairs only the
/// `dropdown` member is transformed. Already-split `{value, label}` objects
/// are left alone, so the walk is idempotent.
pub fn split_composites(value: &Value) -> Value {
    walk(value, &|s: &str| match split_composite(s) {
        parts if parts.is_pair() => {
            let mut map = Map::new();
            map.insert("value".to_string(), Value::String(parts.value().to_string()));
            map.insert("label".to_string(), Value::String(parts.label().to_string()));
            Value::Object(map)
        }
        _ => Value::String(s.to_string()),
    })
}

/// Replace every composite string with its bare identifier.
pub fn truncate_composites(value: &Value) -> Value {
    walk(value, &|s: &str| Value::String(split_composite(s).value().to_string()))
}

fn walk(value: &Value, leaf: &dyn Fn(&str) -> Value) -> Value {
    match value {
        Value::String(s) => leaf(s),
        Value::Array(items) => Value::Array(items.iter().map(|item| walk(item, leaf)).collect()),
        Value::Object(map) if is_lookup_pair(map) => value.clone(),
        Value::Object(map) if is_measured_pair(map) => {
            let mut out = map.clone();
            if let Some(dropdown) = map.get("dropdown") {
                out.insert("dropdown".to_string(), walk(dropdown, leaf));
            }
            Value::Object(out)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| (key.clone(), walk(inner, leaf)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_walks_nested_payloads() {
        let payload = json!({
            "Tariff": "T01 || Rail tariff",
            "Remarks": "plain text",
            "Qty": { "dropdown": "KG || Kilogram", "input": "12 || not a lookup" },
            "Wagons": [ { "WagonType": "HBBINS || Covered" }, 4, null ],
        });

        let split = split_composites(&payload);
        assert_eq!(split["Tariff"], json!({ "value": "T01", "label": "Rail tariff" }));
        assert_eq!(split["Remarks"], json!("plain text"));
        assert_eq!(
            split["Qty"],
            json!({ "dropdown": { "value": "KG", "label": "Kilogram" }, "input": "12 || not a lookup" })
        );
        assert_eq!(split["Wagons"][0]["WagonType"]["value"], json!("HBBINS"));
        assert_eq!(split["Wagons"][1], json!(4));
        assert_eq!(split["Wagons"][2], json!(null));
    }

    #[test]
    fn split_is_idempotent() {
        let payload = json!({ "Cluster": "C1 || North || East" });
        let once = split_composites(&payload);
        assert_eq!(split_composites(&once), once);
        assert_eq!(once["Cluster"]["label"], json!("North || East"));
    }

    #[test]
    fn truncate_keeps_identifiers_only() {
        let payload = json!({
            "Customer": "CUS01 || Acme",
            "Qty": { "dropdown": "KG || Kilogram", "input": "12" },
            "Flags": [true, "A || b"],
        });
        assert_eq!(
            truncate_composites(&payload),
            json!({
                "Customer": "CUS01",
                "Qty": { "dropdown": "KG", "input": "12" },
                "Flags": [true, "A"],
            })
        );
    }
}
