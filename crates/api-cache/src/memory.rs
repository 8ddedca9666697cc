//! In-process memory tier.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use tradebook_core::cache::CacheEntry;

/// Process-local cache tier.
///
/// Per tab/worker and never synchronized across processes - cross-process
/// consistency comes from the persistent tier only.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.key.clone(), entry);
    }

    pub fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn remove_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Drop entries last validated before `cutoff`.
    pub fn prune_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.timestamp >= cutoff);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}
