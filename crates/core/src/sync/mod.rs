//! Sync queue domain - queued offline mutations and their contracts.

mod sync_item_model;
mod sync_traits;

pub use sync_item_model::{
    sort_for_drain, NewPendingSyncItem, PendingSyncItem, SyncItemStatus, SyncOperation,
    SyncPriority,
};
pub use sync_traits::{PendingSyncRepositoryTrait, SyncTriggerRegistrarTrait, SyncTriggerSinkTrait};
