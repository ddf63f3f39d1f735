//! Lazy option provider.
//!
//! Dropdowns whose choices are fetched on demand: debounced search,
//! incremental pagination and a "more available" signal. The provider itself
//! is a sans-IO state machine; [`LazyOptionProvider::load`] is the async
//! driver that runs a request against an [`OptionSource`].

pub mod debounce;
pub mod error;
pub mod option;
pub mod provider;
pub mod source;

pub use debounce::Debouncer;
pub use error::LookupError;
pub use option::{LookupOption, OptionPage, OptionQuery};
pub use provider::{
    Completion, LazyOptionProvider, LookupSettings, PageKind, PageRequest, ProviderState,
    ScrollMetrics, Selection, SelectionMode,
};
pub use source::{OptionSource, StaticOptions};
