use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{SecretError, SecretStore};

/// Secret store backed by a fixed map; registered as `IN_MEMORY`.
///
/// Counts the lookups it serves, which makes it the usual stand-in for a
/// remote backend in tests.
#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: HashMap<String, String>,
    calls: AtomicUsize,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, locator: impl Into<String>, plaintext: impl Into<String>) -> Self {
        self.secrets.insert(locator.into(), plaintext.into());
        self
    }

    /// Number of `resolve` calls served so far, hits and misses alike.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for InMemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySecretStore")
            .field("locators", &self.secrets.keys().collect::<Vec<_>>())
            .field("calls", &self.calls())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for InMemorySecretStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            secrets: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl SecretStore for InMemorySecretStore {
    fn resolve(&self, locator: &str) -> Result<String, SecretError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.secrets
            .get(locator)
            .cloned()
            .ok_or_else(|| SecretError::not_found(locator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let store = InMemorySecretStore::new().with_secret("db/password", "hunter2");
        assert_eq!(store.resolve("db/password").unwrap(), "hunter2");
        assert!(matches!(
            store.resolve("db/missing"),
            Err(SecretError::NotFound { .. })
        ));
        assert_eq!(store.calls(), 2);
    }
}
