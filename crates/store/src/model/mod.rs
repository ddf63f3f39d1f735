//! Wire model of the order aggregate.

pub mod attachment;
pub mod line;
pub mod quick_order;
pub mod resource_group;
pub mod status;

pub use attachment::{Attachment, AttachmentOwner, AttachmentRef, NewAttachment};
pub use line::{ActualDetail, Line, LineDetails, LineEntity, LineKind, PlanDetail};
pub use quick_order::{QuickOrder, QuickOrderPatch};
pub use resource_group::{ResourceGroup, ResourceGroupDraft};
pub use status::{OrderType, ResourceStatus};
