//! Secret store selection by type tag

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::{FileSecretStore, InMemorySecretStore, SecretError, SecretStore};
use crate::bootstrap::SecretsConfig;
use crate::error::ConfError;

/// Builds a secret store from the decoded secrets configuration.
pub type SecretStoreFactory =
    Box<dyn Fn(&SecretsConfig) -> Result<Arc<dyn SecretStore>, SecretError> + Send + Sync>;

/// Maps `SECRET_MANAGER` tags to secret store factories.
///
/// The default registry knows `FILESYSTEM` and `IN_MEMORY`. Remote
/// backends (cloud secret managers, Vault) are registered by the
/// application under their own tag. Tags compare case-insensitively.
pub struct SecretStoreRegistry {
    factories: BTreeMap<String, SecretStoreFactory>,
}

impl SecretStoreRegistry {
    pub const FILESYSTEM: &'static str = "FILESYSTEM";
    pub const IN_MEMORY: &'static str = "IN_MEMORY";

    /// A registry with no backends at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory, replacing any previous one for the same tag.
    pub fn register<F>(&mut self, kind: &str, factory: F) -> &mut Self
    where
        F: Fn(&SecretsConfig) -> Result<Arc<dyn SecretStore>, SecretError> + Send + Sync + 'static,
    {
        let kind = kind.to_ascii_uppercase();
        debug!(kind = %kind, "registering secret manager");
        self.factories.insert(kind, Box::new(factory));
        self
    }

    /// Builder form of [`SecretStoreRegistry::register`].
    pub fn with<F>(mut self, kind: &str, factory: F) -> Self
    where
        F: Fn(&SecretsConfig) -> Result<Arc<dyn SecretStore>, SecretError> + Send + Sync + 'static,
    {
        self.register(kind, factory);
        self
    }

    /// Register an already-built store under `kind`.
    pub fn with_store(self, kind: &str, store: Arc<dyn SecretStore>) -> Self {
        self.with(kind, move |_| Ok(Arc::clone(&store)))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(&kind.to_ascii_uppercase())
    }

    /// Registered tags, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Construct the store selected by `config.secret_manager`.
    pub fn build(&self, config: &SecretsConfig) -> Result<Arc<dyn SecretStore>, ConfError> {
        let kind = config.secret_manager.to_ascii_uppercase();
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| ConfError::UnsupportedBackend { kind: kind.clone() })?;
        let store = factory(config).map_err(|source| ConfError::SecretStore {
            kind: kind.clone(),
            source,
        })?;
        info!(kind = %kind, "secret manager ready");
        Ok(store)
    }
}

impl Default for SecretStoreRegistry {
    fn default() -> Self {
        Self::empty()
            .with(Self::FILESYSTEM, |config| {
                Ok(Arc::new(FileSecretStore::new(&config.secrets_dir)) as Arc<dyn SecretStore>)
            })
            .with(Self::IN_MEMORY, |_| {
                Ok(Arc::new(InMemorySecretStore::new()) as Arc<dyn SecretStore>)
            })
    }
}

impl std::fmt::Debug for SecretStoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStoreRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: &str) -> SecretsConfig {
        SecretsConfig {
            secret_manager: kind.to_string(),
            ..SecretsConfig::default()
        }
    }

    #[test]
    fn test_default_kinds() {
        let registry = SecretStoreRegistry::default();
        assert_eq!(registry.kinds(), vec!["FILESYSTEM", "IN_MEMORY"]);
    }

    #[test]
    fn test_build_is_case_insensitive() {
        let registry = SecretStoreRegistry::default();
        assert!(registry.build(&config("in_memory")).is_ok());
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let registry = SecretStoreRegistry::default();
        match registry.build(&config("GOOGLE_SECRET_MANAGER")) {
            Err(ConfError::UnsupportedBackend { kind }) => {
                assert_eq!(kind, "GOOGLE_SECRET_MANAGER")
            }
            other => panic!("expected UnsupportedBackend, got {other:?}"),
        }
    }

    #[test]
    fn test_registered_store_is_returned() {
        let store: Arc<dyn SecretStore> =
            Arc::new(InMemorySecretStore::new().with_secret("a", "b"));
        let registry = SecretStoreRegistry::empty().with_store("STUB", store);
        let built = registry.build(&config("stub")).unwrap();
        assert_eq!(built.resolve("a").unwrap(), "b");
    }

    #[test]
    fn test_factory_failure_names_kind() {
        let registry = SecretStoreRegistry::empty().with("BROKEN", |_| {
            Err(SecretError::backend("*", "no credentials"))
        });
        let err = registry.build(&config("BROKEN")).unwrap_err();
        assert!(matches!(err, ConfError::SecretStore { ref kind, .. } if kind == "BROKEN"));
    }
}
