//! Resolving `secret://` references through a registered backend

use std::sync::Arc;

use chrono::TimeDelta;
use secretconf::{
    Bootstrap, EnvConfig, Finalize, InMemorySecretStore, MapLookuper, SecretError, SecretStore,
    SecretStoreRegistry, ValidationError,
};

/// Stands in for a remote secret manager client.
#[derive(Debug)]
struct VaultStore {
    secrets: InMemorySecretStore,
}

impl SecretStore for VaultStore {
    fn resolve(&self, locator: &str) -> Result<String, SecretError> {
        tracing::info!(locator, "fetching secret from vault");
        self.secrets.resolve(locator)
    }
}

#[derive(Debug, Default, EnvConfig)]
struct Config {
    #[env(required)]
    pub token_signing_key: String,

    // Resolved again from the cache, not the backend
    #[env(name = "TOKEN_SIGNING_KEY")]
    pub token_signing_key_copy: String,

    // Written to SECRETS_DIR; the field holds the file path
    #[env(required)]
    pub tls_certificate: String,

    #[env(default = "1h")]
    pub code_duration: TimeDelta,
}

impl Finalize for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        secretconf::validate::non_negative("CODE_DURATION", self.code_duration)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let secrets_dir = tempfile::TempDir::new()?;

    let registry = SecretStoreRegistry::default().with("VAULT", |_| {
        let secrets = InMemorySecretStore::new()
            .with_secret("kv/signing-key", "abc123")
            .with_secret("kv/tls-cert", "-----BEGIN CERTIFICATE-----");
        Ok(Arc::new(VaultStore { secrets }) as Arc<dyn SecretStore>)
    });

    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "VAULT")
        .with("SECRET_CACHE_TTL", "10m")
        .with("SECRETS_DIR", secrets_dir.path().to_string_lossy().to_string())
        .with("TOKEN_SIGNING_KEY", "secret://kv/signing-key")
        .with("TLS_CERTIFICATE", "secret://kv/tls-cert?target=file")
        .with("CODE_DURATION", "2h");

    let config: Config = Bootstrap::new(&env).registry(registry).load()?;

    println!("token signing key: {}", config.token_signing_key);
    println!("tls certificate written to: {}", config.tls_certificate);
    println!("code duration: {}m", config.code_duration.num_minutes());

    // A negative duration fails validation with the key in the message
    let env = env.with("CODE_DURATION", "-5m");
    match Bootstrap::new(&env).load::<Config>() {
        Ok(_) => println!("unexpectedly valid"),
        Err(e) => println!("rejected: {e}"),
    }

    Ok(())
}
