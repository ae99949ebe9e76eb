//! In-process response cache with a fixed freshness window.
//!
//! Keyed by the normalized inbound request (method + full URI including
//! query). Entries are never revalidated against upstream: within the
//! freshness window a hit is served as-is, after it the entry is treated
//! as absent and lazily dropped. Only successful responses are stored.
//!
//! The cache is a pure optimization layer; disabling it changes latency
//! and upstream load, never observable behavior.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

/// Default freshness window for cached responses.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

/// A captured response, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// HTTP status of the original response (always 2xx).
    pub status: u16,
    /// The `Content-Type` the response was served with.
    pub content_type: &'static str,
    /// Response body bytes.
    pub body: Bytes,
}

struct CacheEntry {
    response: CachedResponse,
    inserted_at: Instant,
}

/// Response cache shared across requests.
///
/// Cheap to clone via `Arc` at the call site; all methods take `&self`.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_age: Duration,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.read().len())
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl ResponseCache {
    /// Creates a cache with the default freshness window.
    pub fn new() -> Self {
        Self::with_max_age(DEFAULT_MAX_AGE)
    }

    /// Creates a cache with a custom freshness window.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    /// The freshness window, in seconds, for `Cache-Control` tagging.
    pub fn max_age_secs(&self) -> u64 {
        self.max_age.as_secs()
    }

    /// Normalized cache key for an inbound request.
    pub fn key(method: &str, uri: &str) -> String {
        format!("{} {}", method, uri)
    }

    /// Returns a fresh entry for `key`, dropping it if stale.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.max_age => {
                    debug!(key, "Cache hit");
                    return Some(entry.response.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Stale: drop under the write lock, re-checking freshness in case
        // a concurrent insert refreshed the entry.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(key) {
            if entry.inserted_at.elapsed() < self.max_age {
                return Some(entry.response.clone());
            }
            entries.remove(key);
            debug!(key, "Dropped stale cache entry");
        }
        None
    }

    /// Stores a response for `key`, overwriting any previous entry.
    ///
    /// Callers only store successful responses; a fresh fetch always
    /// produces a new entry rather than mutating the old one.
    pub fn insert(&self, key: String, response: CachedResponse) {
        debug_assert!((200..300).contains(&response.status));

        let mut entries = self.entries.write();
        entries.insert(
            key,
            CacheEntry {
                response,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live entries (stale entries count until dropped).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            content_type: "text/plain",
            body: Bytes::copy_from_slice(body.as_bytes()),
        }
    }

    #[test]
    fn miss_then_hit() {
        let cache = ResponseCache::new();
        let key = ResponseCache::key("GET", "/api/text?url=https://example.com/a");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), response("hello"));
        assert_eq!(cache.get(&key), Some(response("hello")));
    }

    #[test]
    fn stale_entries_are_dropped() {
        let cache = ResponseCache::with_max_age(Duration::from_millis(10));
        let key = ResponseCache::key("GET", "/api/text?url=https://example.com/a");

        cache.insert(key.clone(), response("hello"));
        assert!(cache.get(&key).is_some());

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_overwrites() {
        let cache = ResponseCache::new();
        let key = ResponseCache::key("GET", "/api/json?url=https://example.com/a");

        cache.insert(key.clone(), response("v1"));
        cache.insert(key.clone(), response("v2"));

        assert_eq!(cache.get(&key), Some(response("v2")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_include_query_string() {
        let a = ResponseCache::key("GET", "/api/json?url=https://example.com/a");
        let b = ResponseCache::key("GET", "/api/json?url=https://example.com/b");
        assert_ne!(a, b);
    }

    #[test]
    fn default_window_is_an_hour() {
        let cache = ResponseCache::new();
        assert_eq!(cache.max_age_secs(), 3600);
    }

    #[test]
    fn debug_impl() {
        let cache = ResponseCache::new();
        let debug = format!("{:?}", cache);
        assert!(debug.contains("ResponseCache"));
        assert!(debug.contains("max_age"));
    }
}
