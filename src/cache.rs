//! Bounded in-memory response caching.
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use log::debug;
use lru::LruCache;

use crate::request::Request;
use crate::response::Response;

/// Responses with bodies of this size or larger are never cached.
pub const MAX_CACHE_ENTRY_SIZE: usize = 10 * 1024 * 1024;

/// Header stamped on responses served from cache.
pub const CACHE_HIT_HEADER: &str = "x-function-cache-hit";

/// Cache id used when the caller does not name one.
pub const DEFAULT_CACHE_ID: &str = "waypoint";

/// A capacity-bounded request-to-response cache. Entries are keyed by
/// method plus full URL; eviction order is the backing store's (least
/// recently used goes first).
///
/// Lookups and stores lock internally, so a single instance can be shared
/// across server threads behind an [`Arc`].
pub struct ResponseCache {
    entries: Mutex<LruCache<String, Response>>,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` responses.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be nonzero");
        Self {
            entries: Mutex::new(LruCache::new(NonZeroUsize::new(capacity).unwrap())),
        }
    }
    /// Stored response for an equivalent request, if any. The returned
    /// response carries the cache-hit marker header.
    pub fn lookup(&self, request: &Request) -> Option<Response> {
        let mut entries = self.entries.lock().unwrap();
        entries
            .get(&request.cache_key())
            .map(|stored| stored.clone().with_header(CACHE_HIT_HEADER, "true"))
    }
    /// Store a response for later lookups. Returns false without storing
    /// when the body is at or over [`MAX_CACHE_ENTRY_SIZE`].
    pub fn store(&self, request: &Request, response: &Response) -> bool {
        if response.content_length() >= MAX_CACHE_ENTRY_SIZE {
            debug!(
                "not caching {}: body of {} bytes is over the ceiling",
                request.path,
                response.content_length()
            );
            return false;
        }
        let mut entries = self.entries.lock().unwrap();
        entries.put(request.cache_key(), response.clone());
        true
    }
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named [`ResponseCache`] instances, shared by reference.
///
/// `open` is idempotent per id: the first call creates the cache, later
/// calls return the same instance regardless of the capacity argument.
/// Pass the registry (or a cache opened from it) into the parts that need
/// caching instead of reaching for a process global.
pub struct CacheRegistry {
    caches: Mutex<HashMap<String, Arc<ResponseCache>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self {
            caches: Mutex::new(HashMap::new()),
        }
    }
    /// Create-or-return the cache named `id`.
    pub fn open(&self, capacity: usize, id: &str) -> Arc<ResponseCache> {
        let mut caches = self.caches.lock().unwrap();
        caches
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(ResponseCache::with_capacity(capacity)))
            .clone()
    }
    /// Create-or-return the cache named [`DEFAULT_CACHE_ID`].
    pub fn open_default(&self, capacity: usize) -> Arc<ResponseCache> {
        self.open(capacity, DEFAULT_CACHE_ID)
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn request_for(path: &str) -> Request {
        let mut request = Request::default();
        request.path = path.to_string();
        request
    }

    fn response_with_body(body: &[u8]) -> Response {
        Response::new(200).with_body(body.to_vec())
    }

    #[test]
    fn test_lookup_carries_hit_marker() {
        let cache = ResponseCache::with_capacity(4);
        let request = request_for("/a");
        cache.store(&request, &response_with_body(b"payload"));

        let hit = cache.lookup(&request).unwrap();
        assert_eq!(hit.header(CACHE_HIT_HEADER), Some("true"));
        assert_eq!(hit.body, Some(b"payload".to_vec()));
    }

    #[test]
    fn test_miss_on_different_query() {
        let cache = ResponseCache::with_capacity(4);
        let mut request = request_for("/a");
        request.query = "page=1".to_string();
        cache.store(&request, &response_with_body(b"one"));

        let mut other = request_for("/a");
        other.query = "page=2".to_string();
        assert!(cache.lookup(&other).is_none());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ResponseCache::with_capacity(2);
        cache.store(&request_for("/a"), &response_with_body(b"a"));
        cache.store(&request_for("/b"), &response_with_body(b"b"));

        // Touch /a so /b is the least recently used entry.
        cache.lookup(&request_for("/a"));
        cache.store(&request_for("/c"), &response_with_body(b"c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.lookup(&request_for("/a")).is_some());
        assert!(cache.lookup(&request_for("/b")).is_none());
        assert!(cache.lookup(&request_for("/c")).is_some());
    }

    #[test]
    fn test_size_ceiling_boundary() {
        let cache = ResponseCache::with_capacity(2);
        let at_ceiling = response_with_body(&vec![0u8; MAX_CACHE_ENTRY_SIZE]);
        let under_ceiling = response_with_body(&vec![0u8; MAX_CACHE_ENTRY_SIZE - 1]);

        assert!(!cache.store(&request_for("/big"), &at_ceiling));
        assert!(cache.lookup(&request_for("/big")).is_none());

        assert!(cache.store(&request_for("/ok"), &under_ceiling));
        assert!(cache.lookup(&request_for("/ok")).is_some());
    }

    #[test]
    fn test_registry_open_is_idempotent() {
        let registry = CacheRegistry::new();
        let first = registry.open(8, "pages");
        let second = registry.open(99, "pages");
        assert!(Arc::ptr_eq(&first, &second));

        let other = registry.open(8, "assets");
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_registry_default_id() {
        let registry = CacheRegistry::new();
        let a = registry.open_default(8);
        let b = registry.open(8, DEFAULT_CACHE_ID);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    #[should_panic(expected = "cache capacity must be nonzero")]
    fn test_zero_capacity_panics() {
        ResponseCache::with_capacity(0);
    }
}
