//! Sync lifecycle event types.

use serde::{Deserialize, Serialize};

use crate::sync::SyncOperation;

/// Lifecycle events emitted by the connectivity monitor and the sync
/// coordinator.
///
/// These events represent facts about the offline data layer. UI-facing
/// status components subscribe to them to surface aggregate sync state
/// (pending count, in progress, last outcome) without polling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// Connectivity was regained.
    Online,

    /// Connectivity was lost.
    Offline,

    /// A sync pass started draining the queue.
    SyncStarted,

    /// A sync pass finished without a transport-level failure.
    ///
    /// `failed` counts items whose individual application failed and were
    /// left queued for retry (or parked, once exhausted).
    SyncSuccess { processed: usize, failed: usize },

    /// A sync pass itself failed and a retry was scheduled.
    SyncError { message: String },

    /// A mutation was accepted locally and queued for synchronization.
    OperationQueued { id: i64, operation: SyncOperation },

    /// The pending queue drained to empty.
    PendingCleared,

    /// A queued mutation exhausted its retries and was parked as failed.
    ItemFailed { id: i64, operation: SyncOperation },
}
