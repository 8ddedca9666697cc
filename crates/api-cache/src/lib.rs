//! Tradebook API response cache.
//!
//! Serves GET-style reads through a memory -> persistent store -> network
//! lookup chain, surviving reloads and minimizing redundant network calls:
//!
//! - canonical cache keys (sorted query parameters)
//! - TTL freshness with optional stale-while-revalidate
//! - ETag validation (`If-None-Match` / 304)
//! - stale fallback when the network fails
//! - in-flight de-duplication: at most one network call per key at any
//!   instant, the result fanned out to every concurrent caller
//!
//! Every returned payload carries provenance metadata
//! ([`tradebook_core::cache::CachedResponse`]) so the UI can surface cache
//! state.

mod fetch;
mod key;
mod memory;
mod service;
mod store;

pub use fetch::{FetchOutcome, HttpFetcher, ReqwestFetcher};
pub use key::cache_key;
pub use memory::MemoryCache;
pub use service::{ApiCache, CacheConfig, CacheStats, FetchOptions};
pub use store::InMemoryCacheStore;
