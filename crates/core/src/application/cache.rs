// Response Cache - TTL cache over an optional backend
//
// Backend failures never reach callers of `get`/`set`: a broken or missing
// backend only costs the cache hit.

use crate::application::constants::DEFAULT_CACHE_TTL;
use crate::port::{CacheBackend, CacheError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a cache read
#[derive(Debug)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    /// Backend missing or failing; treated as a miss by `get`
    Unavailable(CacheError),
}

pub struct ResponseCache {
    backend: Option<Arc<dyn CacheBackend>>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
            default_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Cache with no backend: every read misses, every write is dropped
    pub fn disabled() -> Self {
        Self {
            backend: None,
            default_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn from_optional(backend: Option<Arc<dyn CacheBackend>>) -> Self {
        match backend {
            Some(backend) => Self::new(backend),
            None => Self::disabled(),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let Some(backend) = &self.backend else {
            return CacheLookup::Unavailable(CacheError::Unavailable(
                "no cache backend configured".to_string(),
            ));
        };

        match backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => CacheLookup::Hit(value),
                Err(e) => {
                    // Stale shape from an older payload type; regenerate
                    warn!(key = %key, error = %e, "Cached payload no longer deserializes");
                    CacheLookup::Miss
                }
            },
            Ok(None) => CacheLookup::Miss,
            Err(e) => CacheLookup::Unavailable(e),
        }
    }

    /// Cached value for `key`, or `None` on miss or backend failure
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key).await {
            CacheLookup::Hit(value) => {
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            CacheLookup::Miss => {
                debug!(key = %key, "Cache miss");
                None
            }
            CacheLookup::Unavailable(e) => {
                if self.is_enabled() {
                    warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                }
                None
            }
        }
    }

    pub async fn store<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let backend = self.backend.as_ref().ok_or_else(|| {
            CacheError::Unavailable("no cache backend configured".to_string())
        })?;
        let payload = serde_json::to_string(value)?;
        backend.set_ex(key, payload, ttl).await
    }

    /// Write-through that never fails; `None` uses the default TTL
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        if !self.is_enabled() {
            return;
        }
        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.store(key, value, ttl).await {
            Ok(()) => debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set"),
            Err(e) => warn!(key = %key, error = %e, "Cache write failed, continuing uncached"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::cache_backend::mocks::{InMemoryCacheBackend, UnavailableCacheBackend};
    use crate::port::time_provider::mocks::MockTimeProvider;
    use serde_json::json;

    fn setup(now: i64) -> (Arc<MockTimeProvider>, Arc<InMemoryCacheBackend>, ResponseCache) {
        let clock = Arc::new(MockTimeProvider::new(now));
        let backend = Arc::new(InMemoryCacheBackend::new(clock.clone()));
        let cache = ResponseCache::new(backend.clone());
        (clock, backend, cache)
    }

    #[tokio::test]
    async fn test_value_readable_until_ttl_then_miss() {
        let (clock, _backend, cache) = setup(1_000);
        let ttl = Duration::from_secs(60);

        cache.set("k", &json!({"x": 1}), Some(ttl)).await;

        clock.advance(59_999);
        assert_eq!(cache.get::<serde_json::Value>("k").await, Some(json!({"x": 1})));

        clock.advance(1);
        assert!(cache.get::<serde_json::Value>("k").await.is_some());

        clock.advance(1);
        assert_eq!(cache.get::<serde_json::Value>("k").await, None);
    }

    #[tokio::test]
    async fn test_default_ttl_is_one_week() {
        let (clock, _backend, cache) = setup(0);
        cache.set("k", &"v", None).await;

        clock.advance(DEFAULT_CACHE_TTL.as_millis() as i64);
        assert_eq!(cache.get::<String>("k").await, Some("v".to_string()));
        clock.advance(1);
        assert_eq!(cache.get::<String>("k").await, None);
    }

    #[tokio::test]
    async fn test_unavailable_backend_degrades_to_miss() {
        let backend = Arc::new(UnavailableCacheBackend::new());
        let cache = ResponseCache::new(backend.clone());

        cache.set("k", &json!([1, 2]), None).await;
        assert_eq!(cache.get::<serde_json::Value>("k").await, None);
        assert_eq!(backend.call_count(), 2);
        assert!(matches!(
            cache.lookup::<serde_json::Value>("k").await,
            CacheLookup::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_disabled_cache_is_silent() {
        let cache = ResponseCache::disabled();
        cache.set("k", &1, None).await;
        assert_eq!(cache.get::<i32>("k").await, None);
        assert!(cache.store("k", &1, DEFAULT_CACHE_TTL).await.is_err());
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_a_miss() {
        let (_clock, backend, cache) = setup(0);
        backend.insert_raw("k", "\"not a number\"", Duration::from_secs(10));
        assert_eq!(cache.get::<i64>("k").await, None);
    }
}
