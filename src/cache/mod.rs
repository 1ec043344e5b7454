//! Short-lived response cache for GET requests.
//!
//! Entries are keyed by a hash of endpoint + request options and expire a
//! fixed time after insertion. There is no size bound; stale entries are
//! dropped lazily when a lookup finds them.

mod key;
mod layer;
mod storage;

pub use key::cache_key;
pub use layer::ResponseCache;
pub use storage::{CacheEntry, CacheStorage, MemoryStorage, NoopStorage};
