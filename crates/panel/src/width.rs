//! 12-column grid widths and row wrapping.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

pub const GRID_COLUMNS: u8 = 12;

/// Column span of a field.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FieldWidth {
    #[default]
    Full,
    Half,
    Third,
    Quarter,
    /// Explicit span, clamped to 1–12.
    Columns(u8),
}

impl FieldWidth {
    pub fn columns(&self) -> u8 {
        match self {
            FieldWidth::Full => 12,
            FieldWidth::Half => 6,
            FieldWidth::Third => 4,
            FieldWidth::Quarter => 3,
            FieldWidth::Columns(n) => (*n).clamp(1, GRID_COLUMNS),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "full" => Some(FieldWidth::Full),
            "half" => Some(FieldWidth::Half),
            "third" => Some(FieldWidth::Third),
            "quarter" => Some(FieldWidth::Quarter),
            other => other.parse::<u8>().ok().and_then(Self::from_span),
        }
    }

    fn from_span(n: u8) -> Option<Self> {
        (1..=GRID_COLUMNS).contains(&n).then_some(FieldWidth::Columns(n))
    }
}

impl Serialize for FieldWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldWidth::Full => serializer.serialize_str("full"),
            FieldWidth::Half => serializer.serialize_str("half"),
            FieldWidth::Third => serializer.serialize_str("third"),
            FieldWidth::Quarter => serializer.serialize_str("quarter"),
            FieldWidth::Columns(n) => serializer.serialize_u8(*n),
        }
    }
}

impl<'de> Deserialize<'de> for FieldWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WidthVisitor;

        impl Visitor<'_> for WidthVisitor {
            type Value = FieldWidth;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("\"full\", \"half\", \"third\", \"quarter\" or a column count 1-12")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldWidth, E> {
                FieldWidth::from_name(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldWidth, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(FieldWidth::from_span)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldWidth, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(WidthVisitor)
    }
}

/// Where a field lands on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub field_id: String,
    /// 1-based start column.
    pub column_start: u8,
    pub span: u8,
}

/// Place fields left to right, starting a new row whenever the next span
/// does not fit in what is left of the current one.
pub fn layout_rows<'a, I>(fields: I) -> Vec<Vec<Placement>>
where
    I: IntoIterator<Item = (&'a str, FieldWidth)>,
{
    let mut rows: Vec<Vec<Placement>> = Vec::new();
    let mut current: Vec<Placement> = Vec::new();
    let mut used: u8 = 0;

    for (field_id, width) in fields {
        let span = width.columns();
        if used + span > GRID_COLUMNS && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(Placement {
            field_id: field_id.to_string(),
            column_start: used + 1,
            span,
        });
        used += span;
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}
