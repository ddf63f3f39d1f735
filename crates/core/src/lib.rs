//! Order model building blocks: ids, mode flags and flat records.
//!
//! This crate contains the identifiers, flags and flat records shared by every
//! other crate in the workspace (no IO, no async).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod mode_flag;
pub mod record;

pub use aggregate::AggregateRoot;
pub use entity::{Entity, Tracked};
pub use error::{DomainError, DomainResult};
pub use id::{EntityId, PanelId, SENTINEL_ID, UserId};
pub use mode_flag::ModeFlag;
pub use record::Record;
