//! TTL cache in front of a secret store

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use super::{SecretError, SecretStore};

/// Cached secret entry with expiration
#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Memoizes a secret store's answers for a fixed TTL.
///
/// Entries are replaced lazily when read after expiry; nothing runs in the
/// background. Concurrent misses for the same locator are not deduplicated,
/// so each may reach the wrapped store. Failed lookups are never cached.
pub struct CachedSecretStore<S> {
    inner: S,
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl<S: SecretStore> CachedSecretStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn cached(&self, locator: &str, now: Instant) -> Option<String> {
        let entry = self.entries.get(locator)?;
        if now < entry.expires_at {
            debug!(locator = %locator, "secret cache hit");
            Some(entry.value.clone())
        } else {
            debug!(locator = %locator, "secret cache entry expired");
            None
        }
    }
}

impl<S: SecretStore> SecretStore for CachedSecretStore<S> {
    fn resolve(&self, locator: &str) -> Result<String, SecretError> {
        if let Some(value) = self.cached(locator, Instant::now()) {
            return Ok(value);
        }

        debug!(locator = %locator, "secret cache miss");
        let value = self.inner.resolve(locator)?;
        self.entries.insert(
            locator.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(value)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CachedSecretStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSecretStore")
            .field("inner", &self.inner)
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.len())
            .finish()
    }
}
