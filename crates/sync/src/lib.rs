//! Tradebook background sync.
//!
//! Reconciles the local store's queue of offline mutations with the remote
//! journal API: drains items in priority order, retries failed passes with
//! exponential backoff, reacts to connectivity transitions, and broadcasts
//! lifecycle events to listeners.
//!
//! The coordinator is an explicit, constructor-injected service with a
//! defined lifecycle: [`SyncCoordinator::create`] returns a handle and
//! [`SyncCoordinator::shutdown`] tears its background tasks down. All
//! collaborators (queue, transport, clock, scheduler) arrive as trait
//! objects, so the whole machine runs in tests without a network or a
//! wall clock.

mod backoff;
mod coordinator;
mod transport;

pub use backoff::ExponentialBackoff;
pub use coordinator::{SyncConfig, SyncCoordinator, SyncDeps, SyncPhase, SyncStatusReport};
pub use transport::{HttpSyncTransport, SyncTransportTrait};
