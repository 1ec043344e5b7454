//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A cached response body and the moment it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  pub payload: Value,
  pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
  pub fn new(payload: Value) -> Self {
    Self {
      payload,
      cached_at: Utc::now(),
    }
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

  /// Insert an entry, replacing any previous entry for the key.
  fn insert(&self, key: &str, entry: CacheEntry) -> Result<()>;

  fn remove(&self, key: &str) -> Result<()>;

  fn clear(&self) -> Result<()>;

  fn len(&self) -> Result<usize>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<CacheEntry>> {
    Ok(None) // Always miss
  }

  fn insert(&self, _key: &str, _entry: CacheEntry) -> Result<()> {
    Ok(()) // Discard
  }

  fn remove(&self, _key: &str) -> Result<()> {
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    Ok(())
  }

  fn len(&self) -> Result<usize> {
    Ok(0)
  }
}

/// Process-wide map of cached responses.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn insert(&self, key: &str, entry: CacheEntry) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(key.to_string(), entry);
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.remove(key);
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.clear();
    Ok(())
  }

  fn len(&self) -> Result<usize> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.len())
  }
}
