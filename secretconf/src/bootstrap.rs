//! Two-phase configuration loading
//!
//! The secret manager settings are decoded first, with no mutators, because
//! every other field may reference a secret. The selected store (cached
//! when `SECRET_CACHE_TTL` is positive) then backs a [`SecretResolver`] for
//! the decode of the main configuration, which is finally post-processed
//! and validated.

use std::fmt;
use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::decode::process_with;
use crate::error::ConfError;
use crate::lookup::{Lookuper, OsLookuper};
use crate::mutate::{Mutator, Mutators};
use crate::resolver::SecretResolver;
use crate::secrets::{CachedSecretStore, SecretStore, SecretStoreRegistry};
use crate::validate::ValidationError;
use crate::EnvConfig;

/// Settings that select and tune the secret store.
#[derive(Debug, Clone, PartialEq, Eq, EnvConfig)]
pub struct SecretsConfig {
    /// Registry tag of the secret store backend.
    #[env(name = "SECRET_MANAGER", default = "FILESYSTEM")]
    pub secret_manager: String,

    /// How long resolved secrets are reused; zero or negative disables caching.
    #[env(name = "SECRET_CACHE_TTL", default = "5m")]
    pub secret_cache_ttl: TimeDelta,

    /// Root of the `FILESYSTEM` backend and destination of `?target=file` secrets.
    #[env(name = "SECRETS_DIR", default = "/var/run/secrets")]
    pub secrets_dir: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            secret_manager: SecretStoreRegistry::FILESYSTEM.to_string(),
            secret_cache_ttl: TimeDelta::minutes(5),
            secrets_dir: "/var/run/secrets".to_string(),
        }
    }
}

/// Hooks run on a decoded configuration before it is handed out.
pub trait Finalize {
    /// Named, structure-specific fixups applied after decoding.
    fn postprocess(&mut self) {}

    /// Check invariants; the first violation is returned.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// The bootstrap step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SecretConfig,
    SecretStore,
    Decode,
    Validate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SecretConfig => "unable to process secret configuration",
            Self::SecretStore => "unable to connect to secret manager",
            Self::Decode => "unable to process configuration",
            Self::Validate => "invalid configuration",
        })
    }
}

/// First failure of a bootstrap, tagged with its stage.
#[derive(Debug, thiserror::Error)]
#[error("{stage}: {source}")]
pub struct BootstrapError {
    pub stage: Stage,
    pub source: ConfError,
}

impl BootstrapError {
    fn at(stage: Stage) -> impl FnOnce(ConfError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Configures and runs a two-phase load.
pub struct Bootstrap<'a> {
    lookuper: &'a dyn Lookuper,
    registry: SecretStoreRegistry,
    mutators: Mutators,
}

impl<'a> Bootstrap<'a> {
    pub fn new(lookuper: &'a dyn Lookuper) -> Self {
        Self {
            lookuper,
            registry: SecretStoreRegistry::default(),
            mutators: Vec::new(),
        }
    }

    /// Replace the default backend registry.
    pub fn registry(mut self, registry: SecretStoreRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Append a mutator; it runs after secret resolution, in the order added.
    pub fn mutator(mut self, mutator: impl Mutator + 'static) -> Self {
        self.mutators.push(Box::new(mutator));
        self
    }

    /// Decode, post-process and validate a `T`.
    pub fn load<T: EnvConfig + Finalize>(self) -> Result<T, BootstrapError> {
        let mut secrets = SecretsConfig::default();
        process_with(&mut secrets, self.lookuper, &[])
            .map_err(BootstrapError::at(Stage::SecretConfig))?;
        debug!(?secrets, "decoded secret configuration");

        let store = self.connect(&secrets)?;

        let mut mutators: Mutators = Vec::with_capacity(self.mutators.len() + 1);
        mutators.push(Box::new(SecretResolver::new(store, &secrets.secrets_dir)));
        mutators.extend(self.mutators);

        let mut config = T::default();
        process_with(&mut config, self.lookuper, &mutators)
            .map_err(BootstrapError::at(Stage::Decode))?;
        debug!("decoded configuration");

        config.postprocess();

        config.validate().map_err(|e| BootstrapError {
            stage: Stage::Validate,
            source: e.into(),
        })?;
        debug!("validated configuration");

        Ok(config)
    }

    fn connect(&self, secrets: &SecretsConfig) -> Result<Arc<dyn SecretStore>, BootstrapError> {
        let store = self
            .registry
            .build(secrets)
            .map_err(BootstrapError::at(Stage::SecretStore))?;

        let ttl = secrets.secret_cache_ttl;
        if ttl <= TimeDelta::zero() {
            info!("secret cache disabled");
            return Ok(store);
        }
        // A positive TimeDelta always converts.
        let ttl = ttl.to_std().unwrap_or_default();
        info!(ttl = %humantime::format_duration(ttl), "secret cache enabled");
        Ok(Arc::new(CachedSecretStore::new(store, ttl)))
    }
}

/// Load `T` from the process environment with the default backends.
pub fn load<T: EnvConfig + Finalize>() -> Result<T, BootstrapError> {
    Bootstrap::new(&OsLookuper).load()
}

/// Load `T` from `lookuper`, choosing the secret store from `registry`.
pub fn load_with<T: EnvConfig + Finalize>(
    lookuper: &dyn Lookuper,
    registry: SecretStoreRegistry,
) -> Result<T, BootstrapError> {
    Bootstrap::new(lookuper).registry(registry).load()
}
