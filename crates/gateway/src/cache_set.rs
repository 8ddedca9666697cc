//! Named, versioned response caches.
//!
//! Mirrors the platform cache-storage model: a set of named caches, each a
//! URL-to-response map. Deployments write to fresh names; activation
//! deletes every cache whose name is not in the current set.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// A cached response body.
#[derive(Clone, Debug)]
pub struct CachedAsset {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

/// The set of named caches owned by the gateway.
#[derive(Default)]
pub struct CacheSet {
    caches: Mutex<HashMap<String, HashMap<String, CachedAsset>>>,
}

impl CacheSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a response, creating the named cache on first use.
    pub fn put(&self, cache_name: &str, url: &str, asset: CachedAsset) {
        self.caches
            .lock()
            .unwrap()
            .entry(cache_name.to_string())
            .or_default()
            .insert(url.to_string(), asset);
    }

    pub fn get(&self, cache_name: &str, url: &str) -> Option<CachedAsset> {
        self.caches
            .lock()
            .unwrap()
            .get(cache_name)
            .and_then(|cache| cache.get(url))
            .cloned()
    }

    /// Delete a whole named cache. Returns whether it existed.
    pub fn delete_cache(&self, cache_name: &str) -> bool {
        self.caches.lock().unwrap().remove(cache_name).is_some()
    }

    /// Names of all existing caches.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Delete every cache whose name is not in `keep`.
    ///
    /// Returns the deleted names.
    pub fn retain_only(&self, keep: &[String]) -> Vec<String> {
        let mut caches = self.caches.lock().unwrap();
        let stale: Vec<String> = caches
            .keys()
            .filter(|name| !keep.contains(name))
            .cloned()
            .collect();
        for name in &stale {
            caches.remove(name);
        }
        stale
    }

    /// Number of entries in a named cache.
    pub fn len(&self, cache_name: &str) -> usize {
        self.caches
            .lock()
            .unwrap()
            .get(cache_name)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}
