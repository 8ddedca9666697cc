//! The cache engine: lookup chain, de-duplication, and fallbacks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use log::{debug, warn};
use tokio::sync::broadcast;

use crate::fetch::{FetchOutcome, HttpFetcher};
use crate::key::cache_key;
use crate::memory::MemoryCache;
use tradebook_core::cache::{CacheEntry, CacheSource, CacheStoreTrait, CachedResponse};
use tradebook_core::constants::{CACHE_RETENTION_DAYS, DEFAULT_CACHE_TTL_MS};
use tradebook_core::errors::{Error, Result};
use tradebook_core::utils::Clock;

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// TTL applied when a request does not specify one.
    pub default_ttl_ms: i64,
    /// Persistent entries older than this are removed by [`ApiCache::prune`].
    pub retention_days: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_CACHE_TTL_MS,
            retention_days: CACHE_RETENTION_DAYS,
        }
    }
}

/// Per-request options for [`ApiCache::fetch`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchOptions {
    /// Override the configured default TTL for entries written by this
    /// request.
    pub ttl_ms: Option<i64>,
    /// Skip both cache tiers and go straight to the network.
    pub force_refresh: bool,
    /// Serve a hit older than half its TTL immediately while refreshing it
    /// in the background.
    pub stale_while_revalidate: bool,
}

/// Observability snapshot of both tiers and the in-flight table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub store_entries: usize,
    pub in_flight: usize,
}

type SharedFetch = Result<CachedResponse>;

enum FlightRole {
    Leader(broadcast::Sender<SharedFetch>),
    Follower(broadcast::Receiver<SharedFetch>),
}

struct CacheInner {
    memory: MemoryCache,
    store: Arc<dyn CacheStoreTrait>,
    fetcher: Arc<dyn HttpFetcher>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    // Single-flight table: one network call per key at any instant. The
    // sender fans the result out to every waiter.
    in_flight: Mutex<HashMap<String, broadcast::Sender<SharedFetch>>>,
}

/// Two-tier cached HTTP read path.
///
/// Cheap to clone; clones share tiers, fetcher, and the in-flight table.
#[derive(Clone)]
pub struct ApiCache {
    inner: Arc<CacheInner>,
}

impl ApiCache {
    pub fn new(
        store: Arc<dyn CacheStoreTrait>,
        fetcher: Arc<dyn HttpFetcher>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                memory: MemoryCache::new(),
                store,
                fetcher,
                clock,
                config,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Resolve a GET through memory -> store -> network.
    ///
    /// See the crate docs for the full contract; in short: fresh hits are
    /// served from the nearest tier, a network failure degrades to the most
    /// recent entry regardless of freshness, and only a full miss combined
    /// with a failure propagates the error.
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(String, String)],
        options: FetchOptions,
    ) -> Result<CachedResponse> {
        let key = cache_key(url, params);
        let now = self.inner.clock.now();
        let ttl_ms = options.ttl_ms.unwrap_or(self.inner.config.default_ttl_ms);

        if !options.force_refresh {
            if let Some((entry, source)) = self.lookup(&key).await? {
                if options.stale_while_revalidate && entry.wants_revalidation(now) {
                    debug!("{}: serving {} hit, revalidating in background", key, source);
                    self.spawn_revalidation(key.clone(), url, params, ttl_ms);
                    return Ok(CachedResponse::new(entry.data, source, entry.timestamp));
                }
                if entry.is_fresh(now) {
                    return Ok(CachedResponse::new(entry.data, source, entry.timestamp));
                }
                // Stale without revalidation: go to the network; the entry
                // stays around as the fallback.
            }
        }

        self.fetch_shared(&key, url, params, ttl_ms).await
    }

    /// Remove one key from both tiers.
    pub async fn invalidate(&self, url: &str, params: &[(String, String)]) -> Result<()> {
        let key = cache_key(url, params);
        self.inner.memory.remove(&key);
        self.inner.store.delete(&key).await
    }

    /// Remove every key starting with `prefix` from both tiers.
    pub async fn invalidate_prefix(&self, prefix: &str) -> Result<usize> {
        let from_memory = self.inner.memory.remove_prefix(prefix);
        let from_store = self.inner.store.delete_prefix(prefix).await?;
        Ok(from_memory.max(from_store))
    }

    /// Wipe both tiers entirely.
    pub async fn clear_all(&self) -> Result<()> {
        self.inner.memory.clear();
        self.inner.store.clear().await
    }

    /// Remove entries older than the retention window from both tiers.
    ///
    /// Returns the number removed from the persistent tier.
    pub async fn prune(&self) -> Result<usize> {
        let cutoff = self.inner.clock.now() - Duration::days(self.inner.config.retention_days);
        let from_memory = self.inner.memory.prune_older_than(cutoff);
        let from_store = self.inner.store.prune_older_than(cutoff).await?;
        debug!(
            "Cache prune removed {} memory / {} store entries",
            from_memory, from_store
        );
        Ok(from_store)
    }

    /// Entry counts per tier plus the in-flight request count.
    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            memory_entries: self.inner.memory.len(),
            store_entries: self.inner.store.count().await?,
            in_flight: self.inner.in_flight.lock().unwrap().len(),
        })
    }

    /// Memory-then-store lookup; store hits are promoted into memory.
    async fn lookup(&self, key: &str) -> Result<Option<(CacheEntry, CacheSource)>> {
        if let Some(entry) = self.inner.memory.get(key) {
            return Ok(Some((entry, CacheSource::Memory)));
        }
        if let Some(entry) = self.inner.store.get(key).await? {
            self.inner.memory.put(entry.clone());
            return Ok(Some((entry, CacheSource::Store)));
        }
        Ok(None)
    }

    /// Lookup without promotion, for fallback and validator purposes.
    async fn peek(&self, key: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.inner.memory.get(key) {
            return Some(entry);
        }
        match self.inner.store.get(key).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Persistent cache tier unavailable for {}: {}", key, err);
                None
            }
        }
    }

    /// Network fetch with in-flight de-duplication.
    ///
    /// The first caller for a key becomes the leader and performs the real
    /// request; concurrent callers for the same key await the leader's
    /// result. At most one network call per key is in flight at any instant.
    async fn fetch_shared(
        &self,
        key: &str,
        url: &str,
        params: &[(String, String)],
        ttl_ms: i64,
    ) -> Result<CachedResponse> {
        let role = {
            let mut in_flight = self.inner.in_flight.lock().unwrap();
            match in_flight.get(key) {
                Some(tx) => FlightRole::Follower(tx.subscribe()),
                None => {
                    let (tx, _rx) = broadcast::channel(1);
                    in_flight.insert(key.to_string(), tx.clone());
                    FlightRole::Leader(tx)
                }
            }
        };

        match role {
            FlightRole::Leader(tx) => {
                let result = self.fetch_network(key, url, params, ttl_ms).await;
                self.inner.in_flight.lock().unwrap().remove(key);
                // No waiters is fine; the send result is irrelevant.
                let _ = tx.send(result.clone());
                result
            }
            FlightRole::Follower(mut rx) => rx.recv().await.map_err(|_| {
                Error::Unexpected("de-duplicated request completed without a result".to_string())
            })?,
        }
    }

    async fn fetch_network(
        &self,
        key: &str,
        url: &str,
        params: &[(String, String)],
        ttl_ms: i64,
    ) -> Result<CachedResponse> {
        let known = self.peek(key).await;
        let validator = known.as_ref().and_then(|entry| entry.etag.clone());

        match self
            .inner
            .fetcher
            .fetch_json(url, params, validator.as_deref())
            .await
        {
            Ok(FetchOutcome::Fresh { etag, body }) => {
                let now = self.inner.clock.now();
                let entry = CacheEntry::new(key, body.clone(), etag, ttl_ms, now);
                self.write_through(entry).await;
                Ok(CachedResponse::new(body, CacheSource::Network, now))
            }
            Ok(FetchOutcome::NotModified) => {
                let now = self.inner.clock.now();
                match known {
                    Some(entry) => {
                        // 304 refreshes the timestamp only; the payload is
                        // untouched.
                        let refreshed = entry.revalidated(now);
                        self.write_through(refreshed.clone()).await;
                        Ok(CachedResponse::new(
                            refreshed.data,
                            CacheSource::NotModified,
                            now,
                        ))
                    }
                    None => Err(Error::http(
                        304,
                        "server reported not-modified but no cached entry exists",
                    )),
                }
            }
            Err(err) => match known {
                // Degraded read: any entry beats an error, fresh or not.
                Some(entry) => {
                    warn!("{}: network failed, serving stale fallback ({})", key, err);
                    Ok(CachedResponse::new(
                        entry.data,
                        CacheSource::StaleFallback,
                        entry.timestamp,
                    ))
                }
                None => Err(err),
            },
        }
    }

    /// Write an entry to both tiers. A failing persistent tier degrades to
    /// memory-only caching rather than failing the read.
    async fn write_through(&self, entry: CacheEntry) {
        self.inner.memory.put(entry.clone());
        if let Err(err) = self.inner.store.put(entry).await {
            warn!("Failed to persist cache entry: {}", err);
        }
    }

    fn spawn_revalidation(&self, key: String, url: &str, params: &[(String, String)], ttl_ms: i64) {
        let cache = self.clone();
        let url = url.to_string();
        let params = params.to_vec();
        tokio::spawn(async move {
            if let Err(err) = cache.fetch_shared(&key, &url, &params, ttl_ms).await {
                debug!("Background revalidation of {} failed: {}", key, err);
            }
        });
    }
}
