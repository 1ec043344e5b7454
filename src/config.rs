use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://festika-ai.vercel.app/api";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  /// Per-attempt timeout; generous because the backend is serverless
  pub timeout_secs: u64,
  /// Extra attempts after a timeout
  pub max_retries: u32,
  pub retry_delay_secs: u64,
  /// How long a successful GET response is served from cache
  pub cache_ttl_secs: u64,
  pub cache_enabled: bool,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_API_URL.to_string(),
      timeout_secs: 60,
      max_retries: 2,
      retry_delay_secs: 2,
      cache_ttl_secs: 5 * 60,
      cache_enabled: true,
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn retry_delay(&self) -> Duration {
    Duration::from_secs(self.retry_delay_secs)
  }

  /// Out-of-range values fall back to the default five minutes.
  pub fn cache_ttl(&self) -> chrono::Duration {
    i64::try_from(self.cache_ttl_secs)
      .ok()
      .and_then(chrono::Duration::try_seconds)
      .unwrap_or_else(|| {
        warn!("cache_ttl_secs {} out of range, using default", self.cache_ttl_secs);
        chrono::Duration::minutes(5)
      })
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  /// Namespace prepended to every key except the admin session
  pub prefix: String,
  /// Override for the SQLite file backing persistent state
  pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      prefix: "citarasa_".to_string(),
      path: None,
    }
  }
}

/// Dashboard credentials. Compared locally, this is a display gate and
/// not a security boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
  pub username: String,
  pub password: String,
}

impl Default for AdminConfig {
  fn default() -> Self {
    Self {
      username: "admin".to_string(),
      password: "admin".to_string(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./citarasa.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/citarasa/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Some(password) = Self::get_admin_password() {
      config.admin.password = password;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("citarasa.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("citarasa").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to null, treat it like no overrides
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Admin password override from CITARASA_ADMIN_PASSWORD.
  fn get_admin_password() -> Option<String> {
    std::env::var("CITARASA_ADMIN_PASSWORD")
      .ok()
      .filter(|p| !p.is_empty())
  }

  /// Directory for the database and log file.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("citarasa"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_match_service_policy() {
    let config = Config::default();
    assert_eq!(config.api.base_url, DEFAULT_API_URL);
    assert_eq!(config.api.timeout(), Duration::from_secs(60));
    assert_eq!(config.api.max_retries, 2);
    assert_eq!(config.api.retry_delay(), Duration::from_secs(2));
    assert_eq!(config.api.cache_ttl(), chrono::Duration::minutes(5));
    assert_eq!(config.storage.prefix, "citarasa_");
    assert_eq!(config.admin.username, "admin");
  }

  #[test]
  fn test_huge_cache_ttl_falls_back() {
    let api = ApiConfig {
      cache_ttl_secs: u64::MAX,
      ..Default::default()
    };
    assert_eq!(api.cache_ttl(), chrono::Duration::minutes(5));

    let api = ApiConfig {
      cache_ttl_secs: i64::MAX as u64,
      ..Default::default()
    };
    assert_eq!(api.cache_ttl(), chrono::Duration::minutes(5));
  }

  #[test]
  fn test_partial_yaml_keeps_defaults() {
    let config = Config::parse("api:\n  base_url: http://localhost:5000/api\n  max_retries: 0\n")
      .unwrap();
    assert_eq!(config.api.base_url, "http://localhost:5000/api");
    assert_eq!(config.api.max_retries, 0);
    assert_eq!(config.api.timeout_secs, 60);
    assert!(config.api.cache_enabled);
    assert_eq!(config.storage.prefix, "citarasa_");
  }

  #[test]
  fn test_empty_file_is_default() {
    let config = Config::parse("  \n").unwrap();
    assert_eq!(config.api.base_url, DEFAULT_API_URL);
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let result = Config::load(Some(Path::new("/nonexistent/citarasa.yaml")));
    assert!(result.is_err());
  }
}
