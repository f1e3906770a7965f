// Trendline Infrastructure - Redis Adapter
// Implements: CacheBackend (GET / SETEX)

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use trendline_core::port::cache_backend::CacheResult;
use trendline_core::port::{CacheBackend, CacheError};

/// Shared Redis connection manager
pub type SharedRedis = Arc<Mutex<ConnectionManager>>;

/// Redis rejects SETEX with a zero expiry
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        CacheError::Unavailable(err.to_string())
    } else {
        CacheError::Backend(err.to_string())
    }
}

#[derive(Clone)]
pub struct RedisCacheBackend {
    redis: SharedRedis,
}

impl RedisCacheBackend {
    pub fn new(redis: SharedRedis) -> Self {
        Self { redis }
    }

    /// Open a managed connection. Fails fast when the server is unreachable so
    /// the caller can run without a cache.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;

        info!(url = %url, "Connected to Redis");
        Ok(Self::new(Arc::new(Mutex::new(manager))))
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.redis.lock().await;
        let value: Option<String> = conn.get(key).await.map_err(map_redis_error)?;
        debug!(key = %key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds(ttl))
            .await
            .map_err(map_redis_error)?;
        debug!(key = %key, ttl_secs = ttl_seconds(ttl), "Redis SETEX");
        Ok(())
    }

    fn name(&self) -> &str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_rounds_up_to_one_second() {
        assert_eq!(ttl_seconds(Duration::from_millis(0)), 1);
        assert_eq!(ttl_seconds(Duration::from_millis(500)), 1);
        assert_eq!(ttl_seconds(Duration::from_secs(3600)), 3600);
    }

    #[tokio::test]
    async fn test_invalid_url_is_error() {
        let result = RedisCacheBackend::connect("not-a-redis-url").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Port 1 is never a Redis server
        let result = RedisCacheBackend::connect("redis://127.0.0.1:1/").await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }
}
