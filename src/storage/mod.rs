//! Namespaced persistent client state: favorites, recent searches and
//! preferences.
//!
//! Values are JSON text. Every key is prefixed with the configured
//! namespace except the `*_global` accessors, which exist for the admin
//! session key.

mod sqlite;

pub use sqlite::SqliteStore;

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::api::types::FoodId;
use crate::config::{Config, StorageConfig};

/// Recent searches kept, newest first.
pub const MAX_RECENT_SEARCHES: usize = 10;

const FAVORITES_KEY: &str = "favorites";
const RECENT_SEARCHES_KEY: &str = "recent_searches";

#[derive(Clone)]
pub struct StorageService {
  store: Arc<SqliteStore>,
  prefix: String,
}

impl StorageService {
  pub fn new(store: SqliteStore, prefix: impl Into<String>) -> Self {
    Self {
      store: Arc::new(store),
      prefix: prefix.into(),
    }
  }

  /// Open the store configured in `storage`, defaulting to the data dir.
  pub fn open(config: &StorageConfig) -> Result<Self> {
    let path = match &config.path {
      Some(path) => path.clone(),
      None => Config::data_dir()?.join("storage.db"),
    };
    Ok(Self::new(SqliteStore::open(&path)?, config.prefix.clone()))
  }

  fn key(&self, key: &str) -> String {
    format!("{}{}", self.prefix, key)
  }

  fn read<T: DeserializeOwned>(&self, full_key: &str) -> Result<Option<T>> {
    match self.store.get_item(full_key)? {
      Some(raw) => serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| eyre!("Corrupt value stored under {}: {}", full_key, e)),
      None => Ok(None),
    }
  }

  fn write<T: Serialize + ?Sized>(&self, full_key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
      .map_err(|e| eyre!("Failed to serialize {}: {}", full_key, e))?;
    self.store.set_item(full_key, &raw)
  }

  // Favorites

  pub fn get_favorites(&self) -> Result<Vec<FoodId>> {
    Ok(self.read(&self.key(FAVORITES_KEY))?.unwrap_or_default())
  }

  /// Returns false if the food was already a favorite.
  pub fn add_favorite(&self, food_id: FoodId) -> Result<bool> {
    let mut favorites = self.get_favorites()?;
    if favorites.contains(&food_id) {
      return Ok(false);
    }
    favorites.push(food_id);
    self.write(&self.key(FAVORITES_KEY), &favorites)?;
    Ok(true)
  }

  /// Returns whether anything was removed.
  pub fn remove_favorite(&self, food_id: FoodId) -> Result<bool> {
    let favorites = self.get_favorites()?;
    let filtered: Vec<FoodId> = favorites
      .iter()
      .copied()
      .filter(|id| *id != food_id)
      .collect();
    self.write(&self.key(FAVORITES_KEY), &filtered)?;
    Ok(filtered.len() != favorites.len())
  }

  pub fn is_favorite(&self, food_id: FoodId) -> Result<bool> {
    Ok(self.get_favorites()?.contains(&food_id))
  }

  /// Flip membership, returning the new state.
  pub fn toggle_favorite(&self, food_id: FoodId) -> Result<bool> {
    if self.remove_favorite(food_id)? {
      Ok(false)
    } else {
      self.add_favorite(food_id)
    }
  }

  // Recent searches

  pub fn get_recent_searches(&self) -> Result<Vec<String>> {
    Ok(self.read(&self.key(RECENT_SEARCHES_KEY))?.unwrap_or_default())
  }

  /// Move `query` to the front, dropping older duplicates and anything
  /// past the cap. Blank queries are ignored.
  pub fn add_recent_search(&self, query: &str) -> Result<()> {
    if query.trim().is_empty() {
      return Ok(());
    }

    let mut searches = self.get_recent_searches()?;
    searches.retain(|s| s != query);
    searches.insert(0, query.to_string());
    searches.truncate(MAX_RECENT_SEARCHES);
    self.write(&self.key(RECENT_SEARCHES_KEY), &searches)
  }

  pub fn clear_recent_searches(&self) -> Result<()> {
    self.store.remove_item(&self.key(RECENT_SEARCHES_KEY))
  }

  // Preferences

  pub fn get_preference<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
    Ok(
      self
        .read(&self.key(&format!("pref_{}", key)))?
        .unwrap_or(default),
    )
  }

  pub fn set_preference<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    self.write(&self.key(&format!("pref_{}", key)), value)
  }

  // Generic namespaced access

  #[allow(dead_code)]
  pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
    Ok(self.read(&self.key(key))?.unwrap_or(default))
  }

  #[allow(dead_code)]
  pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    self.write(&self.key(key), value)
  }

  // Un-namespaced access

  pub fn get_global<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    self.read(key)
  }

  pub fn set_global<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    self.write(key, value)
  }

  pub fn remove_global(&self, key: &str) -> Result<()> {
    self.store.remove_item(key)
  }

  /// Wipe all persisted state, including the admin session.
  pub fn clear_all(&self) -> Result<()> {
    self.store.clear()
  }
}

#[cfg(test)]
pub(crate) fn memory_storage() -> StorageService {
  StorageService::new(SqliteStore::open_in_memory().unwrap(), "citarasa_")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_add_favorite_is_idempotent() {
    let storage = memory_storage();

    assert!(storage.add_favorite(42).unwrap());
    assert!(storage.is_favorite(42).unwrap());
    assert!(!storage.add_favorite(42).unwrap());
    assert_eq!(storage.get_favorites().unwrap(), vec![42]);
  }

  #[test]
  fn test_remove_favorite_reports_change() {
    let storage = memory_storage();
    storage.add_favorite(1).unwrap();
    storage.add_favorite(2).unwrap();

    assert!(storage.remove_favorite(1).unwrap());
    assert!(!storage.remove_favorite(1).unwrap());
    assert!(!storage.is_favorite(1).unwrap());
    assert_eq!(storage.get_favorites().unwrap(), vec![2]);
  }

  #[test]
  fn test_toggle_favorite() {
    let storage = memory_storage();
    assert!(storage.toggle_favorite(9).unwrap());
    assert!(!storage.toggle_favorite(9).unwrap());
    assert!(!storage.is_favorite(9).unwrap());
  }

  #[test]
  fn test_recent_searches_dedup_most_recent_first() {
    let storage = memory_storage();
    storage.add_recent_search("a").unwrap();
    storage.add_recent_search("b").unwrap();
    storage.add_recent_search("a").unwrap();

    assert_eq!(storage.get_recent_searches().unwrap(), vec!["a", "b"]);
  }

  #[test]
  fn test_recent_searches_capped_at_ten() {
    let storage = memory_storage();
    for i in 0..11 {
      storage.add_recent_search(&format!("q{}", i)).unwrap();
    }

    let searches = storage.get_recent_searches().unwrap();
    assert_eq!(searches.len(), MAX_RECENT_SEARCHES);
    assert_eq!(searches[0], "q10");
    assert!(!searches.contains(&"q0".to_string()));
  }

  #[test]
  fn test_blank_search_not_recorded() {
    let storage = memory_storage();
    storage.add_recent_search("   ").unwrap();
    assert!(storage.get_recent_searches().unwrap().is_empty());
  }

  #[test]
  fn test_clear_recent_searches() {
    let storage = memory_storage();
    storage.add_recent_search("soto").unwrap();
    storage.clear_recent_searches().unwrap();
    assert!(storage.get_recent_searches().unwrap().is_empty());
  }

  #[test]
  fn test_preferences_default_when_absent() {
    let storage = memory_storage();
    assert_eq!(
      storage
        .get_preference("directory_sort", "name-asc".to_string())
        .unwrap(),
      "name-asc"
    );

    storage.set_preference("directory_sort", "rating-desc").unwrap();
    assert_eq!(
      storage
        .get_preference("directory_sort", "name-asc".to_string())
        .unwrap(),
      "rating-desc"
    );
  }

  #[test]
  fn test_keys_are_namespaced() {
    let storage = memory_storage();
    storage.set("theme", "dark").unwrap();
    storage.add_favorite(5).unwrap();

    assert_eq!(
      storage.store.get_item("citarasa_theme").unwrap().as_deref(),
      Some("\"dark\"")
    );
    assert_eq!(
      storage.store.get_item("citarasa_favorites").unwrap().as_deref(),
      Some("[5]")
    );
    assert_eq!(storage.store.get_item("theme").unwrap(), None);
    assert_eq!(storage.get("theme", String::new()).unwrap(), "dark");
  }

  #[test]
  fn test_corrupt_value_fails_loudly() {
    let storage = memory_storage();
    storage
      .store
      .set_item("citarasa_favorites", "not json")
      .unwrap();

    assert!(storage.get_favorites().is_err());
    assert!(storage.add_favorite(1).is_err());
  }

  #[test]
  fn test_global_keys_skip_prefix() {
    let storage = memory_storage();
    storage.set_global("admin_auth", &true).unwrap();
    assert_eq!(
      storage.store.get_item("admin_auth").unwrap().as_deref(),
      Some("true")
    );
    assert_eq!(storage.get_global::<bool>("admin_auth").unwrap(), Some(true));

    storage.remove_global("admin_auth").unwrap();
    assert_eq!(storage.get_global::<bool>("admin_auth").unwrap(), None);
  }

  #[test]
  fn test_clear_all_wipes_everything() {
    let storage = memory_storage();
    storage.add_favorite(7).unwrap();
    storage.add_recent_search("rendang").unwrap();
    storage.set_global("admin_auth", &true).unwrap();

    storage.clear_all().unwrap();
    assert!(storage.get_favorites().unwrap().is_empty());
    assert!(storage.get_recent_searches().unwrap().is_empty());
    assert_eq!(storage.get_global::<bool>("admin_auth").unwrap(), None);
  }
}
