//! Cache entry and response provenance models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cached API response.
///
/// An entry is "fresh" while its age is below `ttl_ms`. Staleness never
/// deletes an entry by itself - stale entries remain usable as a fallback
/// when the network is unavailable. Entries are overwritten on every
/// successful response and on 304 Not-Modified (which refreshes only the
/// timestamp).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Canonical cache key: URL plus sorted query parameters.
    pub key: String,
    /// The response payload.
    pub data: Value,
    /// When the payload was last validated against the network.
    pub timestamp: DateTime<Utc>,
    /// Server-supplied version token, if any.
    pub etag: Option<String>,
    /// Time-to-live in milliseconds.
    pub ttl_ms: i64,
}

impl CacheEntry {
    pub fn new(
        key: impl Into<String>,
        data: Value,
        etag: Option<String>,
        ttl_ms: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            data,
            timestamp: now,
            etag,
            ttl_ms,
        }
    }

    /// Age of the entry at the given instant.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// True while `now - timestamp < ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.age(now) < Duration::milliseconds(self.ttl_ms)
    }

    /// True once the entry has passed half of its TTL.
    ///
    /// Stale-while-revalidate serves such an entry immediately but schedules
    /// a background refresh.
    pub fn wants_revalidation(&self, now: DateTime<Utc>) -> bool {
        self.age(now) > Duration::milliseconds(self.ttl_ms / 2)
    }

    /// Refresh only the validation timestamp, keeping the payload.
    ///
    /// Used for 304 Not-Modified responses.
    pub fn revalidated(mut self, now: DateTime<Utc>) -> Self {
        self.timestamp = now;
        self
    }
}

/// Where a returned payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheSource {
    /// In-process memory tier.
    Memory,
    /// Persistent store tier.
    Store,
    /// Fresh network response.
    Network,
    /// Stale entry served because the network failed.
    StaleFallback,
    /// 304 validation - cached payload confirmed current.
    NotModified,
}

impl std::fmt::Display for CacheSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Memory => "memory",
            Self::Store => "store",
            Self::Network => "network",
            Self::StaleFallback => "stale-fallback",
            Self::NotModified => "not-modified",
        };
        write!(f, "{}", s)
    }
}

/// Payload returned by the cache, tagged with provenance so the UI can
/// surface cache state. The tagging is part of the contract, not incidental.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResponse {
    pub data: Value,
    /// True unless the payload came straight from the network.
    pub cached: bool,
    pub source: CacheSource,
    /// Validation timestamp of the served payload.
    pub timestamp: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(data: Value, source: CacheSource, timestamp: DateTime<Utc>) -> Self {
        Self {
            data,
            cached: source != CacheSource::Network,
            source,
            timestamp,
        }
    }
}
