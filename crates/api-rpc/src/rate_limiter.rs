//! Token bucket limiter for generation-backed methods.
//!
//! Every cache miss on those methods costs an upstream completion call, so the
//! bucket bounds the upstream request rate rather than raw RPC traffic.

use std::sync::Mutex;
use std::time::Instant;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    /// `burst` tokens available up front, `per_sec` tokens added every second
    pub fn new(burst: u32, per_sec: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            }),
            capacity: f64::from(burst),
            refill_per_sec: f64::from(per_sec),
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;
    }

    /// Take one token; false when the bucket is empty
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(|p| p.into_inner());
        self.refill(&mut bucket);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Whole tokens currently available
    pub fn available(&self) -> u32 {
        let mut bucket = self.bucket.lock().unwrap_or_else(|p| p.into_inner());
        self.refill(&mut bucket);
        bucket.tokens.floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_allows_burst_then_denies() {
        let limiter = RateLimiter::new(3, 1);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_refills_over_time() {
        let limiter = RateLimiter::new(2, 10);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(limiter.available() >= 1);
        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let limiter = RateLimiter::new(5, 1000);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(limiter.available(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_bucket() {
        let limiter = Arc::new(RateLimiter::new(50, 1));
        let mut handles = Vec::new();
        for _ in 0..10 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                (0..10).filter(|_| limiter.try_acquire()).count()
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            allowed += handle.await.unwrap();
        }
        // 50 burst plus at most one refilled token during the test
        assert!((50..=51).contains(&allowed), "allowed {allowed}");
    }
}
