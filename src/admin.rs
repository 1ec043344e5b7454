//! Admin dashboard gate.
//!
//! Credentials come from config and are compared locally. The session is a
//! display flag persisted under `admin_auth`, with no server-side
//! counterpart, and expires 24 hours after login.

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::storage::StorageService;

const SESSION_KEY: &str = "admin_auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
  pub is_authenticated: bool,
  pub username: String,
  /// Login time, epoch milliseconds
  pub timestamp: i64,
}

impl AdminSession {
  pub fn session_lifetime() -> Duration {
    Duration::hours(24)
  }

  pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
    let cutoff = (now - Self::session_lifetime()).timestamp_millis();
    self.is_authenticated && self.timestamp > cutoff
  }
}

#[derive(Clone)]
pub struct AdminAuth {
  storage: StorageService,
  credentials: AdminConfig,
}

impl AdminAuth {
  pub fn new(storage: StorageService, credentials: AdminConfig) -> Self {
    Self {
      storage,
      credentials,
    }
  }

  /// Check credentials and persist a session on success.
  pub fn login(&self, username: &str, password: &str) -> Result<Option<AdminSession>> {
    if username != self.credentials.username || password != self.credentials.password {
      warn!("Rejected admin login for {}", username);
      return Ok(None);
    }

    let session = AdminSession {
      is_authenticated: true,
      username: username.to_string(),
      timestamp: Utc::now().timestamp_millis(),
    };
    self.storage.set_global(SESSION_KEY, &session)?;
    info!("Admin {} logged in", username);

    Ok(Some(session))
  }

  /// The persisted session, if it is still within its validity window.
  pub fn current_session(&self) -> Result<Option<AdminSession>> {
    self.session_at(Utc::now())
  }

  fn session_at(&self, now: DateTime<Utc>) -> Result<Option<AdminSession>> {
    let session: Option<AdminSession> = self.storage.get_global(SESSION_KEY)?;
    Ok(session.filter(|s| s.is_valid_at(now)))
  }

  pub fn logout(&self) -> Result<()> {
    info!("Admin logged out");
    self.storage.remove_global(SESSION_KEY)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::memory_storage;

  fn auth() -> AdminAuth {
    AdminAuth::new(memory_storage(), AdminConfig::default())
  }

  #[test]
  fn test_login_with_valid_credentials() {
    let auth = auth();
    let session = auth.login("admin", "admin").unwrap().unwrap();

    assert!(session.is_authenticated);
    assert_eq!(session.username, "admin");
    assert_eq!(auth.current_session().unwrap(), Some(session));
  }

  #[test]
  fn test_login_with_wrong_password() {
    let auth = auth();
    assert!(auth.login("admin", "salah").unwrap().is_none());
    assert!(auth.current_session().unwrap().is_none());
  }

  #[test]
  fn test_session_expires_after_a_day() {
    let auth = auth();
    auth.login("admin", "admin").unwrap();

    let later = Utc::now() + Duration::hours(23);
    assert!(auth.session_at(later).unwrap().is_some());

    let expired = Utc::now() + Duration::hours(24) + Duration::seconds(1);
    assert!(auth.session_at(expired).unwrap().is_none());
  }

  #[test]
  fn test_stale_stored_session_is_rejected_on_load() {
    let storage = memory_storage();
    let old = AdminSession {
      is_authenticated: true,
      username: "admin".to_string(),
      timestamp: (Utc::now() - Duration::hours(25)).timestamp_millis(),
    };
    storage.set_global(SESSION_KEY, &old).unwrap();

    let auth = AdminAuth::new(storage, AdminConfig::default());
    assert!(auth.current_session().unwrap().is_none());
  }

  #[test]
  fn test_session_wire_format() {
    let session = AdminSession {
      is_authenticated: true,
      username: "admin".to_string(),
      timestamp: 1_700_000_000_000,
    };
    assert_eq!(
      serde_json::to_value(&session).unwrap(),
      serde_json::json!({"isAuthenticated": true, "username": "admin", "timestamp": 1_700_000_000_000i64})
    );
  }

  #[test]
  fn test_logout_clears_session() {
    let auth = auth();
    auth.login("admin", "admin").unwrap();
    auth.logout().unwrap();
    assert!(auth.current_session().unwrap().is_none());
  }
}
