//! Persistent cache tier contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::CacheEntry;
use crate::errors::Result;

/// Contract for the persistent tier of the API response cache.
///
/// Implementations must survive process restarts (the SQLite store) or may be
/// ephemeral for tests. Lookups never fail on absence - a miss is `Ok(None)`.
#[async_trait]
pub trait CacheStoreTrait: Send + Sync {
    /// Point lookup by canonical cache key.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or overwrite an entry.
    async fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Remove a single entry. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every entry whose key starts with `prefix`.
    ///
    /// Returns the number of removed entries.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize>;

    /// Remove all entries.
    async fn clear(&self) -> Result<()>;

    /// Remove entries last validated before `cutoff` (storage hygiene).
    ///
    /// Returns the number of removed entries.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize>;
}
