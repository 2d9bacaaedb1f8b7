//! In-memory set of revoked session ids.
//!
//! Sign-out inserts the token's `jti`. Every authenticated request checks it after the
//! JWT itself validated, so expired tokens never reach the cache and LRU eviction of old
//! entries is harmless once their tokens have expired.

use foyer::{Cache, CacheBuilder};
use std::sync::Arc;

/// Default capacity for the revocation cache.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Revoked session token ids.
#[derive(Clone)]
pub struct RevocationCache {
    inner: Arc<Cache<String, ()>>,
    capacity: usize,
}

impl RevocationCache {
    pub fn new(capacity: usize) -> Self {
        let cache = CacheBuilder::new(capacity).build();
        Self {
            inner: Arc::new(cache),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Marks the session with token id `jti` as ended.
    pub fn revoke(&self, jti: impl Into<String>) {
        self.inner.insert(jti.into(), ());
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.inner.get(jti).is_some()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.usage()
    }
}

impl Default for RevocationCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for RevocationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationCache")
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_check() {
        let cache = RevocationCache::new(100);
        assert!(!cache.is_revoked("jti-1"));

        cache.revoke("jti-1");

        assert!(cache.is_revoked("jti-1"));
        assert!(!cache.is_revoked("jti-2"));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache1 = RevocationCache::new(100);
        let cache2 = cache1.clone();

        cache2.revoke(String::from("jti-1"));
        assert!(cache1.is_revoked("jti-1"));
    }

    #[test]
    fn test_capacity_bounds() {
        let cache = RevocationCache::new(3);
        for i in 0..5 {
            cache.revoke(format!("jti-{i}"));
        }
        assert!(cache.is_revoked("jti-4"));
        assert!(cache.len() <= 5);
    }

    #[test]
    fn test_debug() {
        let debug_str = format!("{:?}", RevocationCache::new(100));
        assert!(debug_str.contains("capacity: 100"));
    }
}
