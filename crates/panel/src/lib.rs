//! Schema-driven panel engine.
//!
//! A [`PanelConfig`] declares the fields of one business form. The
//! [`PanelEngine`] orders and lays them out on a 12-column grid, holds their
//! values, validates them, and merges a per-user layout override loaded from a
//! [`PersonalizationStore`].

pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod personalization;
pub mod storage;
pub mod validation;
pub mod width;

pub use config::PanelConfig;
pub use engine::{
    FormValues, LoadTicket, PanelEngine, PanelHandle, RenderedCell, RenderedPanel, ResolvedField,
};
pub use error::PanelError;
pub use field::{FieldDescriptor, FieldEvents, FieldKind, FieldValue};
pub use personalization::{FieldSettings, PanelSettings, PersonalizationStore};
pub use storage::{
    CachedPersonalizationStore, InMemoryLocalStorage, LocalStorage, StorageError, panel_cache_key,
};
pub use validation::ValidationReport;
pub use width::{FieldWidth, GRID_COLUMNS, Placement, layout_rows};
