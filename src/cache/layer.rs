//! TTL policy on top of a cache storage backend.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::{CacheEntry, CacheStorage};

/// Response cache that enforces a fixed time-to-live.
///
/// Cache failures never fail a request: they are logged and treated as a
/// miss. Clones share the same storage.
#[derive(Clone)]
pub struct ResponseCache {
  storage: Arc<dyn CacheStorage>,
  /// How long an entry stays valid after insertion
  stale_time: Duration,
}

impl ResponseCache {
  /// Create a new cache with the default five minute lifetime.
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::minutes(5),
    }
  }

  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// An entry is valid while it is strictly younger than the stale time.
  fn is_stale(&self, cached_at: DateTime<Utc>) -> bool {
    Utc::now() - cached_at >= self.stale_time
  }

  /// Look up a fresh payload. Stale entries are evicted here.
  pub fn get(&self, key: &str) -> Option<Value> {
    let entry = match self.storage.get(key) {
      Ok(entry) => entry?,
      Err(e) => {
        warn!("Cache lookup failed: {}", e);
        return None;
      }
    };

    if self.is_stale(entry.cached_at) {
      debug!("Evicting stale cache entry {}", key);
      if let Err(e) = self.storage.remove(key) {
        warn!("Failed to evict stale cache entry: {}", e);
      }
      return None;
    }

    Some(entry.payload)
  }

  /// Store a payload stamped with the current time.
  pub fn put(&self, key: &str, payload: Value) {
    if let Err(e) = self.storage.insert(key, CacheEntry::new(payload)) {
      warn!("Failed to store cache entry: {}", e);
    }
  }

  /// Drop every entry.
  pub fn clear(&self) {
    if let Err(e) = self.storage.clear() {
      warn!("Failed to clear cache: {}", e);
    }
  }

  /// Number of stored entries, stale ones included.
  pub fn len(&self) -> usize {
    self.storage.len().unwrap_or(0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{MemoryStorage, NoopStorage};
  use serde_json::json;

  #[test]
  fn test_fresh_entry_is_served() {
    let cache = ResponseCache::new(MemoryStorage::new());
    cache.put("k", json!({"foods": []}));
    assert_eq!(cache.get("k"), Some(json!({"foods": []})));
  }

  #[test]
  fn test_stale_entry_is_evicted_on_lookup() {
    let cache = ResponseCache::new(MemoryStorage::new()).with_stale_time(Duration::zero());
    cache.put("k", json!(1));
    assert_eq!(cache.len(), 1);

    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.len(), 0);
  }

  #[test]
  fn test_clear_empties_everything() {
    let cache = ResponseCache::new(MemoryStorage::new());
    cache.put("a", json!(1));
    cache.put("b", json!(2));

    let shared = cache.clone();
    shared.clear();

    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.len(), 0);
  }

  #[test]
  fn test_noop_storage_never_hits() {
    let cache = ResponseCache::new(NoopStorage);
    cache.put("k", json!(1));
    assert_eq!(cache.get("k"), None);
  }
}
