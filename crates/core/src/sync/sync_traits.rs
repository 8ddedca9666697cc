//! Sync queue repository and platform trigger traits.
//!
//! These traits define the contracts between the local store, the sync
//! coordinator, and the network interception layer without tying any of them
//! to a concrete implementation.

use async_trait::async_trait;

use super::{NewPendingSyncItem, PendingSyncItem};
use crate::errors::Result;

/// Contract for the durable pending-sync queue.
#[async_trait]
pub trait PendingSyncRepositoryTrait: Send + Sync {
    /// Persist a new queued mutation.
    async fn enqueue(&self, item: NewPendingSyncItem) -> Result<PendingSyncItem>;

    /// All pending items, pre-sorted into drain order
    /// (priority desc, queued_at asc).
    fn pending(&self) -> Result<Vec<PendingSyncItem>>;

    /// Items that exhausted their retries and were parked.
    fn failed(&self) -> Result<Vec<PendingSyncItem>>;

    /// Number of pending items.
    fn pending_count(&self) -> Result<usize>;

    /// Remove a queue item after successful remote acknowledgment.
    /// Removing an absent id succeeds.
    async fn remove(&self, id: i64) -> Result<()>;

    /// Record a failed attempt on an item.
    ///
    /// Returns `true` while the item stays queued for another attempt, and
    /// `false` once the retry ceiling is hit - at which point the item leaves
    /// the pending queue and is parked as failed.
    async fn increment_retry(&self, id: i64) -> Result<bool>;

    /// Drop every queued item (pending and failed).
    async fn clear(&self) -> Result<()>;
}

/// Registration side of deferred background sync.
///
/// The coordinator asks the network interception layer to register a named
/// trigger while offline, so queued mutations flush even if the application
/// is not foregrounded when connectivity returns.
pub trait SyncTriggerRegistrarTrait: Send + Sync {
    fn register_sync(&self, tag: &str) -> Result<()>;
}

/// Firing side of deferred background sync.
///
/// Implemented by the sync coordinator; invoked by the interception layer
/// when a registered trigger fires.
#[async_trait]
pub trait SyncTriggerSinkTrait: Send + Sync {
    async fn trigger_sync(&self, tag: &str);
}
