//! Port interface for caching serialised endpoint responses.
use async_trait::async_trait;

use super::{ResponseCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum ResponseCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "response cache backend failure: {message}"; service_unavailable,
    }
}

/// Store of response bodies keyed by request fingerprint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Read a cached body for the given key.
    async fn get(&self, key: &ResponseCacheKey) -> Result<Option<Vec<u8>>, ResponseCacheError>;

    /// Store a body under the supplied key.
    async fn put(&self, key: &ResponseCacheKey, body: &[u8]) -> Result<(), ResponseCacheError>;
}

/// Cache that never stores anything; used when no Redis URL is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpResponseCache;

#[async_trait]
impl ResponseCache for NoOpResponseCache {
    async fn get(&self, _key: &ResponseCacheKey) -> Result<Option<Vec<u8>>, ResponseCacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &ResponseCacheKey, _body: &[u8]) -> Result<(), ResponseCacheError> {
        Ok(())
    }
}
