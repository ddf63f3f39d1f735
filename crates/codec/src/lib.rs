//! Field value codec.
//!
//! Converts between the compact display form used by composite form fields
//! (`"ID || Description"`, `{dropdown, input}`) and the structured values the
//! backend stores in separate columns. Everything here is pure.

pub mod amount;
pub mod composite;
pub mod walk;

pub use amount::{
    AmountDirection, AmountError, DecimalLocale, convert_amount_field, delocalize_amount,
    localize_amount,
};
pub use composite::{
    COMPOSITE_SEPARATOR, Composite, format_with_label, split_composite, truncate_composite,
};
pub use walk::{is_lookup_pair, is_measured_pair, split_composites, truncate_composites};
