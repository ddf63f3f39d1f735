//! Decimal separator conversion for amount columns.
//!
//! Only the named amount columns go through this; the generic composite walk
//! never touches numbers.

use quickorder_core::Record;
use thiserror::Error;

/// Display convention for decimals.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DecimalLocale {
    /// `1,234.56` (the backend form).
    #[default]
    Dot,
    /// `1.234,56`
    Comma,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AmountDirection {
    /// Display form → backend dot form (pre-submit).
    ToBackend,
    /// Backend dot form → display form (post-fetch).
    ToDisplay,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount '{0}'")]
    Invalid(String),
}

/// Convert a display amount into the backend form (`.` decimal, no grouping).
///
/// Empty input stays empty.
pub fn delocalize_amount(input: &str, locale: DecimalLocale) -> Result<String, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let normalized: String = match locale {
        DecimalLocale::Dot => trimmed.chars().filter(|c| *c != ',' && *c != ' ').collect(),
        DecimalLocale::Comma => trimmed
            .chars()
            .filter(|c| *c != '.' && *c != ' ')
            .map(|c| if c == ',' { '.' } else { c })
            .collect(),
    };

    if is_plain_decimal(&normalized) {
        Ok(normalized)
    } else {
        Err(AmountError::Invalid(input.to_string()))
    }
}

/// Convert a backend amount into the display form for `locale`.
pub fn localize_amount(input: &str, locale: DecimalLocale) -> Result<String, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !is_plain_decimal(trimmed) {
        return Err(AmountError::Invalid(input.to_string()));
    }
    Ok(match locale {
        DecimalLocale::Dot => trimmed.to_string(),
        DecimalLocale::Comma => trimmed.replace('.', ","),
    })
}

/// Apply the conversion to one named column of a record.
///
/// Missing or null columns are left alone.
pub fn convert_amount_field(
    record: &mut Record,
    field: &str,
    locale: DecimalLocale,
    direction: AmountDirection,
) -> Result<(), AmountError> {
    let Some(current) = record.get_str(field) else {
        return Ok(());
    };
    let converted = match direction {
        AmountDirection::ToBackend => delocalize_amount(&current, locale)?,
        AmountDirection::ToDisplay => localize_amount(&current, locale)?,
    };
    record.insert(field, converted);
    Ok(())
}

fn is_plain_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}
