use crate::CacheInvalidator;
use analyzer_protocol::InvalidationKey;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    stale: bool,
}

/// In-memory query cache keyed by [`InvalidationKey`].
///
/// Invalidating a key marks every entry whose key starts with it stale; the
/// values are kept so callers can still render them while recomputing.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<InvalidationKey, CacheEntry>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<InvalidationKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, key: InvalidationKey, value: serde_json::Value) {
        self.lock().insert(key, CacheEntry { value, stale: false });
    }

    /// Returns the cached value only while it is fresh.
    #[must_use]
    pub fn get(&self, key: &InvalidationKey) -> Option<serde_json::Value> {
        self.lock()
            .get(key)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.value.clone())
    }

    /// Returns the cached value even when stale.
    #[must_use]
    pub fn get_stale(&self, key: &InvalidationKey) -> Option<serde_json::Value> {
        self.lock().get(key).map(|entry| entry.value.clone())
    }

    #[must_use]
    pub fn is_stale(&self, key: &InvalidationKey) -> bool {
        self.lock().get(key).is_some_and(|entry| entry.stale)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Marks matching entries stale and returns how many were fresh before.
    pub fn mark_stale(&self, key: &InvalidationKey) -> usize {
        let mut marked = 0;
        for (entry_key, entry) in self.lock().iter_mut() {
            if key.is_prefix_of(entry_key) && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        marked
    }
}

impl CacheInvalidator for QueryCache {
    fn invalidate(&self, key: &InvalidationKey) {
        let marked = self.mark_stale(key);
        log::debug!("invalidated {key}: {marked} entries marked stale");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(parts: &[&str]) -> InvalidationKey {
        InvalidationKey::new(parts.iter().copied())
    }

    #[test]
    fn invalidation_matches_by_prefix() {
        let cache = QueryCache::new();
        cache.insert(key(&["project-ingestion", "get-summary", "t-1"]), json!(1));
        cache.insert(key(&["project-ingestion", "get-summary", "t-2"]), json!(2));
        cache.insert(key(&["status", "t-1"]), json!(3));

        cache.invalidate(&key(&["project-ingestion", "get-summary", "t-1"]));

        assert!(cache.is_stale(&key(&["project-ingestion", "get-summary", "t-1"])));
        assert!(!cache.is_stale(&key(&["project-ingestion", "get-summary", "t-2"])));
        assert_eq!(cache.get(&key(&["status", "t-1"])), Some(json!(3)));
    }

    #[test]
    fn scope_invalidation_covers_every_task() {
        let cache = QueryCache::new();
        cache.insert(key(&["project-ingestion", "get-summary", "t-1"]), json!(1));
        cache.insert(key(&["project-ingestion", "get-summary", "t-2"]), json!(2));

        assert_eq!(cache.mark_stale(&key(&["project-ingestion"])), 2);
    }

    #[test]
    fn invalidating_twice_equals_once() {
        let cache = QueryCache::new();
        let k = key(&["project-ingestion", "get-summary", "t-1"]);
        cache.insert(k.clone(), json!({ "files": 3 }));

        assert_eq!(cache.mark_stale(&k), 1);
        assert_eq!(cache.mark_stale(&k), 0);
        assert!(cache.get(&k).is_none());
        assert_eq!(cache.get_stale(&k), Some(json!({ "files": 3 })));
    }

    #[test]
    fn reinsert_refreshes_entry() {
        let cache = QueryCache::new();
        let k = key(&["a", "b"]);
        cache.insert(k.clone(), json!(1));
        cache.invalidate(&k);
        cache.insert(k.clone(), json!(2));

        assert_eq!(cache.get(&k), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }
}
