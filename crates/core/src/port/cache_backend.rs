// Cache Backend Port (Interface)

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Outcome of a failed backend call. Callers decide whether to swallow it.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Raw key/value store with per-key expiry (GET / SETEX semantics)
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a value; expired keys read as `None`
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a value that expires after `ttl`
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

pub mod mocks {
    use super::*;
    use crate::port::TimeProvider;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-process backend whose expiry follows an injected clock
    pub struct InMemoryCacheBackend {
        entries: Arc<Mutex<HashMap<String, (String, i64)>>>,
        time_provider: Arc<dyn TimeProvider>,
        set_count: Arc<Mutex<usize>>,
    }

    impl InMemoryCacheBackend {
        pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
            Self {
                entries: Arc::new(Mutex::new(HashMap::new())),
                time_provider,
                set_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn set_count(&self) -> usize {
            *self.set_count.lock().unwrap()
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
        }

        pub fn insert_raw(&self, key: &str, value: &str, ttl: Duration) {
            let expires_at = self.time_provider.now_millis() + ttl.as_millis() as i64;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), expires_at));
        }
    }

    #[async_trait]
    impl CacheBackend for InMemoryCacheBackend {
        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            let now = self.time_provider.now_millis();
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .get(key)
                .filter(|(_, expires_at)| now <= *expires_at)
                .map(|(value, _)| value.clone()))
        }

        async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
            *self.set_count.lock().unwrap() += 1;
            self.insert_raw(key, &value, ttl);
            Ok(())
        }

        fn name(&self) -> &str {
            "in-memory"
        }
    }

    /// Backend that fails every call, as an unreachable server would
    pub struct UnavailableCacheBackend {
        call_count: Arc<Mutex<usize>>,
    }

    impl UnavailableCacheBackend {
        pub fn new() -> Self {
            Self {
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    impl Default for UnavailableCacheBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CacheBackend for UnavailableCacheBackend {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            *self.call_count.lock().unwrap() += 1;
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set_ex(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
            *self.call_count.lock().unwrap() += 1;
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "unavailable"
        }
    }
}
