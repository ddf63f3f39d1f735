//! Coordination between panels, the order store and the backend.
//!
//! A save validates the panels involved, flattens their values into backend
//! columns, writes them into the store, submits the whole `QuickOrder` and
//! replaces the store with the server's copy. Failures roll back staged
//! inserts.

pub mod api;
pub mod attachment;
pub mod columns;
pub mod coordinator;
pub mod error;
pub mod gate;
pub mod master_data;
pub mod personalization;

pub use api::{
    ApiEnvelope, AttachmentUpload, MasterDataRequest, MasterDataRow, PersonalizationRequest,
    PersonalizationRow, QuickOrderApi, QuickOrderResponse, StoredFile, SubmitResult,
};
pub use attachment::{DEFAULT_MIME_TYPE, DownloadedFile, mime_type_for, mime_type_for_extension};
pub use columns::{ColumnBinding, ColumnMap};
pub use coordinator::{LinePanels, ResourceGroupPanels, SaveOutcome, SyncCoordinator, SyncOptions};
pub use error::{FieldIssue, SyncError, TransportError, ValidationIssues};
pub use gate::{EntityKey, SaveGate, SavePermit};
pub use master_data::MasterDataOptions;
pub use personalization::RemotePersonalizationStore;
