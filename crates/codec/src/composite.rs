//! `"ID || Label"` display strings.

/// Separator between the identifier and the label of a composite value.
pub const COMPOSITE_SEPARATOR: &str = "||";

/// A display string split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite<'a> {
    /// No separator: the display string is the value itself.
    Plain(&'a str),
    /// `"value || label"`.
    Pair { value: &'a str, label: &'a str },
}

impl<'a> Composite<'a> {
    /// Identifier portion (the whole string for plain values).
    pub fn value(&self) -> &'a str {
        match self {
            Composite::Plain(s) => s,
            Composite::Pair { value, .. } => value,
        }
    }

    /// Label portion (empty for plain values).
    pub fn label(&self) -> &'a str {
        match self {
            Composite::Plain(_) => "",
            Composite::Pair { label, .. } => label,
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Composite::Pair { .. })
    }
}

/// Build a display string from two backend columns.
///
/// Empty id yields `""`; empty label yields the id alone.
pub fn format_with_label(id: &str, label: &str) -> String {
    if id.is_empty() {
        return String::new();
    }
    if label.is_empty() {
        return id.to_string();
    }
    format!("{id} {COMPOSITE_SEPARATOR} {label}")
}

/// Split a display string at the first separator.
///
/// Anything after the first separator belongs to the label, separators
/// included.
pub fn split_composite(display: &str) -> Composite<'_> {
    match display.split_once(COMPOSITE_SEPARATOR) {
        Some((value, label)) => Composite::Pair {
            value: value.trim(),
            label: label.trim(),
        },
        None => Composite::Plain(display),
    }
}

/// The bare identifier of a display string.
pub fn truncate_composite(display: &str) -> &str {
    split_composite(display).value()
}
