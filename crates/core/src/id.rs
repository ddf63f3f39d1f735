//! Identifiers used across the order model.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// Wire value of an identifier the server has not assigned yet.
pub const SENTINEL_ID: i64 = -1;

/// Identifier of an entity inside the Quick Order aggregate.
///
/// Entities created locally carry [`EntityId::Staged`] (sent as `-1`) until the
/// first successful submit that includes them; the server then assigns the
/// real identifier, which arrives with the canonical copy of the order.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    #[default]
    Staged,
    Assigned(i64),
}

impl EntityId {
    /// Build an identifier from its wire value (`-1` maps to `Staged`).
    pub fn from_raw(raw: i64) -> Self {
        if raw == SENTINEL_ID {
            Self::Staged
        } else {
            Self::Assigned(raw)
        }
    }

    pub fn as_raw(&self) -> i64 {
        match self {
            EntityId::Staged => SENTINEL_ID,
            EntityId::Assigned(id) => *id,
        }
    }

    pub fn is_staged(&self) -> bool {
        matches!(self, EntityId::Staged)
    }

    /// Server-assigned identifier, if any.
    pub fn server_id(&self) -> Option<i64> {
        match self {
            EntityId::Staged => None,
            EntityId::Assigned(id) => Some(*id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::from_raw(value)
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Staged);
        }
        trimmed
            .parse::<i64>()
            .map(Self::from_raw)
            .map_err(|e| DomainError::invalid_id(format!("EntityId '{trimmed}': {e}")))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The backend is inconsistent: ids arrive as numbers, numeric strings,
        // empty strings or null for rows it has not keyed yet.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(EntityId::Staged),
            Some(Raw::Number(n)) => Ok(EntityId::from_raw(n)),
            Some(Raw::Text(s)) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Identifier of an operator (personalization owner).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a panel (one business form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, " must not be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_newtype!(UserId, "UserId");
impl_string_newtype!(PanelId, "PanelId");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentinel_round_trips_through_wire_value() {
        assert_eq!(EntityId::from_raw(-1), EntityId::Staged);
        assert_eq!(serde_json::to_value(EntityId::Staged).unwrap(), json!(-1));
        assert_eq!(serde_json::to_value(EntityId::Assigned(42)).unwrap(), json!(42));
    }

    #[test]
    fn deserializes_numbers_strings_and_null() {
        let ids: Vec<EntityId> =
            serde_json::from_value(json!([7, "8", "-1", "", null, -1])).unwrap();
        assert_eq!(
            ids,
            vec![
                EntityId::Assigned(7),
                EntityId::Assigned(8),
                EntityId::Staged,
                EntityId::Staged,
                EntityId::Staged,
                EntityId::Staged,
            ]
        );
    }

    #[test]
    fn rejects_non_numeric_identifiers() {
        let err = "R-01".parse::<EntityId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn empty_user_id_is_invalid() {
        assert!("  ".parse::<UserId>().is_err());
        assert_eq!("ops01".parse::<UserId>().unwrap().as_str(), "ops01");
    }
}
