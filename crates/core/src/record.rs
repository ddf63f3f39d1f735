//! Flat section records (backend column → value).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A flat record of scalar and composite columns.
///
/// Every section of the aggregate (`BasicDetails`, `BillingDetails`, the six
/// line sub-records, the order header, ...) is one of these. Keys are backend
/// column names; values are whatever JSON the backend stores for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String view of a column. Numbers and booleans are rendered; null and
    /// missing columns yield `None`.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of `self` (columns in `other` win).
    pub fn merge(&mut self, other: Record) {
        self.0.extend(other.0);
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

impl From<serde_json::Map<String, Value>> for Record {
    fn from(value: serde_json::Map<String, Value>) -> Self {
        Self(value.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_str_renders_scalars() {
        let record: Record = [("A", json!("x")), ("B", json!(12)), ("C", json!(null))]
            .into_iter()
            .collect();
        assert_eq!(record.get_str("A").as_deref(), Some("x"));
        assert_eq!(record.get_str("B").as_deref(), Some("12"));
        assert_eq!(record.get_str("C"), None);
        assert_eq!(record.get_str("D"), None);
    }

    #[test]
    fn merge_overwrites_existing_columns() {
        let mut base: Record = [("A", json!(1)), ("B", json!(2))].into_iter().collect();
        base.merge([("B", json!(3)), ("C", json!(4))].into_iter().collect());
        assert_eq!(base.get("A"), Some(&json!(1)));
        assert_eq!(base.get("B"), Some(&json!(3)));
        assert_eq!(base.get("C"), Some(&json!(4)));
    }
}
