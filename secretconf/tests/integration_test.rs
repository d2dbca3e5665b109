//! Integration tests

use secretconf::{
    Bootstrap, ConfError, EnvConfig, FieldSpec, Finalize, InMemorySecretStore, MapLookuper,
    MutateError, SecretStoreRegistry, Stage, ValidationError, Value,
};
use serial_test::serial;
use std::env;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Debug, Default, EnvConfig)]
struct AppConfig {
    #[env(required)]
    pub database_password: String,

    #[env(default = "secret://api/key")]
    pub api_key: String,

    #[env(default = "info")]
    pub log_level: String,

    /// Read twice so caching is observable.
    #[env(name = "DATABASE_PASSWORD")]
    pub database_password_again: String,
}

impl Finalize for AppConfig {
    fn postprocess(&mut self) {
        self.log_level = self.log_level.to_lowercase();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.database_password.is_empty() {
            return Err(ValidationError::invalid(
                "DATABASE_PASSWORD",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

fn stub_store() -> Arc<InMemorySecretStore> {
    Arc::new(
        InMemorySecretStore::new()
            .with_secret("db/password", "hunter2")
            .with_secret("api/key", "k-123")
            .with_secret("empty", ""),
    )
}

fn registry(store: &Arc<InMemorySecretStore>) -> SecretStoreRegistry {
    SecretStoreRegistry::empty().with_store("STUB", store.clone())
}

#[test]
fn test_references_resolved_and_cached() {
    let store = stub_store();
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "STUB")
        .with("DATABASE_PASSWORD", "secret://db/password");

    let config: AppConfig = Bootstrap::new(&env)
        .registry(registry(&store))
        .load()
        .unwrap();

    assert_eq!(config.database_password, "hunter2");
    assert_eq!(config.database_password_again, "hunter2");
    // Default literals are references too.
    assert_eq!(config.api_key, "k-123");
    // db/password once (second read is a cache hit), api/key once.
    assert_eq!(store.calls(), 2);
}

#[test]
fn test_zero_ttl_disables_cache() {
    let store = stub_store();
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "STUB")
        .with("SECRET_CACHE_TTL", "0")
        .with("DATABASE_PASSWORD", "secret://db/password");

    let config: AppConfig = Bootstrap::new(&env)
        .registry(registry(&store))
        .load()
        .unwrap();

    assert_eq!(config.database_password_again, "hunter2");
    assert_eq!(store.calls(), 3);
}

#[test]
fn test_postprocess_runs_before_validate() {
    let store = stub_store();
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "STUB")
        .with("DATABASE_PASSWORD", "plain")
        .with("LOG_LEVEL", "DEBUG");

    let config: AppConfig = Bootstrap::new(&env)
        .registry(registry(&store))
        .load()
        .unwrap();
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_unsupported_backend() {
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "AZURE_KEY_VAULT")
        .with("DATABASE_PASSWORD", "plain");

    let err = Bootstrap::new(&env).load::<AppConfig>().unwrap_err();
    assert_eq!(err.stage, Stage::SecretStore);
    assert!(matches!(
        err.source,
        ConfError::UnsupportedBackend { ref kind } if kind == "AZURE_KEY_VAULT"
    ));
}

#[test]
fn test_bad_secret_config_fails_first() {
    let env = MapLookuper::new().with("SECRET_CACHE_TTL", "soon");

    let err = Bootstrap::new(&env).load::<AppConfig>().unwrap_err();
    assert_eq!(err.stage, Stage::SecretConfig);
    assert!(matches!(err.source, ConfError::Parse { ref name, .. } if name == "SECRET_CACHE_TTL"));
}

#[test]
fn test_unresolvable_reference_names_field_and_locator() {
    let store = stub_store();
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "STUB")
        .with("DATABASE_PASSWORD", "secret://db/missing");

    let err = Bootstrap::new(&env)
        .registry(registry(&store))
        .load::<AppConfig>()
        .unwrap_err();

    assert_eq!(err.stage, Stage::Decode);
    match err.source {
        ConfError::Mutate { name, source } => {
            assert_eq!(name, "DATABASE_PASSWORD");
            assert!(matches!(
                source,
                MutateError::SecretResolution { ref locator, .. } if locator == "db/missing"
            ));
        }
        other => panic!("expected Mutate error, got {other:?}"),
    }
}

#[test]
fn test_validation_failure() {
    let store = stub_store();
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "STUB")
        .with("DATABASE_PASSWORD", "secret://empty");

    let err = Bootstrap::new(&env)
        .registry(registry(&store))
        .load::<AppConfig>()
        .unwrap_err();

    assert_eq!(err.stage, Stage::Validate);
    assert_eq!(err.source.env_name(), Some("DATABASE_PASSWORD"));
}

#[test]
fn test_extra_mutators_run_after_resolution() {
    let store = stub_store();
    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "STUB")
        .with("DATABASE_PASSWORD", "secret://db/password");

    let config: AppConfig = Bootstrap::new(&env)
        .registry(registry(&store))
        .mutator(|spec: &FieldSpec, value: Value| -> Result<Value, MutateError> {
            match value {
                Value::Plain(s) if spec.key == "DATABASE_PASSWORD" => {
                    Ok(Value::Plain(s.chars().rev().collect()))
                }
                other => Ok(other),
            }
        })
        .load()
        .unwrap();

    assert_eq!(config.database_password, "2retnuh");
}

#[test]
fn test_filesystem_backend() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("db")).unwrap();
    fs::write(dir.path().join("db/password"), "from-disk\n").unwrap();
    fs::create_dir_all(dir.path().join("api")).unwrap();
    fs::write(dir.path().join("api/key"), "disk-key").unwrap();

    let env = MapLookuper::new()
        .with("SECRETS_DIR", dir.path().to_string_lossy().to_string())
        .with("DATABASE_PASSWORD", "secret://db/password");

    let config: AppConfig = Bootstrap::new(&env).load().unwrap();
    assert_eq!(config.database_password, "from-disk");
    assert_eq!(config.api_key, "disk-key");
}

#[test]
#[serial]
fn test_load_from_process_environment() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("api")).unwrap();
    fs::write(dir.path().join("api/key"), "env-key").unwrap();

    env::set_var("SECRETS_DIR", dir.path());
    env::set_var("DATABASE_PASSWORD", "direct");
    env::remove_var("SECRET_MANAGER");
    env::remove_var("SECRET_CACHE_TTL");
    env::remove_var("API_KEY");
    env::remove_var("LOG_LEVEL");

    let config: AppConfig = secretconf::load().unwrap();
    assert_eq!(config.database_password, "direct");
    assert_eq!(config.api_key, "env-key");
    assert_eq!(config.log_level, "info");

    env::remove_var("SECRETS_DIR");
    env::remove_var("DATABASE_PASSWORD");
}

#[test]
#[serial]
fn test_missing_required_from_process_environment() {
    env::remove_var("DATABASE_PASSWORD");
    env::set_var("SECRET_MANAGER", "IN_MEMORY");

    let err = secretconf::load::<AppConfig>().unwrap_err();
    assert_eq!(err.stage, Stage::Decode);
    assert!(matches!(err.source, ConfError::Missing { ref name } if name == "DATABASE_PASSWORD"));

    env::remove_var("SECRET_MANAGER");
}
