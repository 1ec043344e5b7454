use serde::Serialize;
use sha2::{Digest, Sha256};

/// Build the cache key for a request.
///
/// The key covers the endpoint path and the full serialized options, so
/// requests that differ in headers or body never share an entry.
pub fn cache_key<T: Serialize>(endpoint: &str, options: &T) -> String {
  let serialized = serde_json::to_string(options).unwrap_or_default();
  let input = format!("{}-{}", endpoint, serialized);

  // SHA256 hash for stable, fixed-length keys
  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}
