use thiserror::Error;

/// Failures of a single API request.
///
/// Reads never surface these to callers (they become a fallback payload);
/// writes propagate them.
#[derive(Error, Debug)]
pub enum ApiError {
  /// Every attempt timed out
  #[error(
    "Request timeout after multiple retries. The server may be cold starting. Please try again in a moment."
  )]
  Timeout { attempts: u32 },

  #[error("HTTP error! status: {0}")]
  Status(u16),

  #[error("Malformed response body: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("Network error: {0}")]
  Transport(String),
}

impl ApiError {
  pub fn is_timeout(&self) -> bool {
    matches!(self, ApiError::Timeout { .. })
  }
}
