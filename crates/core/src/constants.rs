/// Default TTL for cached API responses, in milliseconds.
pub const DEFAULT_CACHE_TTL_MS: i64 = 5 * 60 * 1000;

/// Cached entries older than this are pruned from the persistent tier.
pub const CACHE_RETENTION_DAYS: i64 = 7;

/// Maximum sync attempts for a queued mutation before it is parked as failed.
pub const SYNC_MAX_RETRIES: i32 = 3;

/// Base delay for the sync pass retry backoff.
pub const SYNC_BASE_RETRY_DELAY_MS: u64 = 5_000;

/// Ceiling for the sync pass retry backoff.
pub const SYNC_MAX_RETRY_DELAY_MS: u64 = 5 * 60 * 1000;

/// Interval of the periodic queue check.
pub const SYNC_PERIODIC_INTERVAL_MS: u64 = 60_000;

/// Background trigger tag registered for deferred trade sync.
pub const SYNC_TAG_TRADES: &str = "sync-trades";
