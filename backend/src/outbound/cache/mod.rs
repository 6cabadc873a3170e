//! Redis-backed response cache adapter.
//!
//! Bodies are stored as raw bytes under the request fingerprint with a TTL.
//! Each write adds a random jitter to the TTL so entries written together do
//! not expire together.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::domain::ports::{ResponseCache, ResponseCacheError, ResponseCacheKey};

/// Expiry settings for cached responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    base: Duration,
    jitter: Duration,
}

impl CacheTtl {
    /// Entries live for `base` plus up to `jitter`.
    #[must_use]
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Pick an expiry in whole seconds, never below one.
    fn pick_seconds(&self, rng: &mut impl Rng) -> u64 {
        let jitter = self.jitter.as_secs();
        let extra = if jitter == 0 { 0 } else { rng.gen_range(0..=jitter) };
        self.base.as_secs().saturating_add(extra).max(1)
    }
}

/// Response cache storing bodies in Redis through a bb8 pool.
#[derive(Clone)]
pub struct RedisResponseCache {
    pool: Pool<RedisConnectionManager>,
    ttl: CacheTtl,
}

impl RedisResponseCache {
    /// Connect a pool of `max_size` connections to the Redis server at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseCacheError::Backend`] when the URL is invalid or the
    /// pool cannot be built.
    pub async fn connect(
        url: &str,
        max_size: u32,
        ttl: CacheTtl,
    ) -> Result<Self, ResponseCacheError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        Ok(Self { pool, ttl })
    }

    fn expiry_seconds(&self) -> u64 {
        self.ttl.pick_seconds(&mut SmallRng::from_entropy())
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &ResponseCacheKey) -> Result<Option<Vec<u8>>, ResponseCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        conn.get::<_, Option<Vec<u8>>>(key.as_str())
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))
    }

    async fn put(&self, key: &ResponseCacheKey, body: &[u8]) -> Result<(), ResponseCacheError> {
        let seconds = self.expiry_seconds();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        conn.set_ex::<_, _, ()>(key.as_str(), body, seconds)
            .await
            .map_err(|err| ResponseCacheError::backend(err.to_string()))?;
        debug!(key = %key, seconds, "cached response");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ttl_without_jitter_is_fixed() {
        let ttl = CacheTtl::new(Duration::from_secs(300), Duration::ZERO);
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(ttl.pick_seconds(&mut rng), 300);
    }

    #[rstest]
    fn ttl_jitter_stays_in_range() {
        let ttl = CacheTtl::new(Duration::from_secs(300), Duration::from_secs(60));
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let seconds = ttl.pick_seconds(&mut rng);
            assert!((300..=360).contains(&seconds), "{seconds} out of range");
        }
    }

    #[rstest]
    fn ttl_never_drops_to_zero() {
        let ttl = CacheTtl::new(Duration::ZERO, Duration::ZERO);
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(ttl.pick_seconds(&mut rng), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_invalid_url() {
        let ttl = CacheTtl::new(Duration::from_secs(1), Duration::ZERO);
        let result = RedisResponseCache::connect("not a url", 1, ttl).await;
        assert!(matches!(result, Err(ResponseCacheError::Backend { .. })));
    }
}
