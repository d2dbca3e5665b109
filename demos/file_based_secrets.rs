//! File-based configuration example
//!
//! Shows both ways a mounted file can feed a field: the `{VAR}_FILE`
//! fallback and the `FILESYSTEM` secret manager.

use secretconf::{Bootstrap, EnvConfig, Finalize, MapLookuper};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[derive(Debug, Default, EnvConfig)]
struct Config {
    // Load from API_KEY or API_KEY_FILE
    #[env(from_file, required)]
    pub api_key: String,

    // Resolved by the FILESYSTEM secret manager under SECRETS_DIR
    #[env(required)]
    pub database_password: String,

    #[env(default = "localhost")]
    pub database_host: String,
}

impl Finalize for Config {}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    // A Docker/Kubernetes style mounted file
    let mut api_key_file = NamedTempFile::new()?;
    writeln!(api_key_file, "super_secret_api_key_12345")?;

    // A secrets directory laid out by locator
    let secrets_dir = TempDir::new()?;
    fs::create_dir_all(secrets_dir.path().join("db"))?;
    fs::write(secrets_dir.path().join("db/password"), "db_password_67890\n")?;

    let env = MapLookuper::new()
        .with("SECRET_MANAGER", "FILESYSTEM")
        .with("SECRETS_DIR", secrets_dir.path().to_string_lossy().to_string())
        .with("API_KEY_FILE", api_key_file.path().to_string_lossy().to_string())
        .with("DATABASE_PASSWORD", "secret://db/password");

    let config: Config = Bootstrap::new(&env).load()?;

    println!("Configuration loaded from files:");
    println!("  API Key: {}", config.api_key);
    println!("  Database Password: {}", config.database_password);
    println!("  Database Host: {}", config.database_host);

    Ok(())
}
