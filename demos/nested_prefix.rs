//! Nested structs and key prefixes

use secretconf::{EnvConfig, MapLookuper, PrefixLookuper};

#[derive(Debug, Default, EnvConfig)]
struct Database {
    #[env(default = "localhost")]
    pub host: String,

    #[env(default = 5432)]
    pub port: u16,

    pub user: Option<String>,
}

#[derive(Debug, Default, EnvConfig)]
#[env(prefix = "APP_")]
struct Config {
    #[env(default = "demo")]
    pub name: String,

    // Reads DB_HOST, DB_PORT, DB_USER
    #[env(nested, prefix = "DB_")]
    pub database: Database,

    // Reads REPLICA_HOST, ...
    #[env(nested, prefix = "REPLICA_")]
    pub replica: Database,
}

fn main() -> anyhow::Result<()> {
    let env = MapLookuper::new()
        .with("APP_NAME", "verifier")
        .with("DB_HOST", "primary.internal")
        .with("DB_USER", "app")
        .with("REPLICA_HOST", "replica.internal")
        .with("REPLICA_PORT", "6432");

    let config: Config = secretconf::process(&env)?;
    println!("{config:#?}");

    // The same struct read under a deployment-wide prefix: STAGING_APP_NAME, STAGING_DB_HOST, ...
    let staging = MapLookuper::new()
        .with("STAGING_APP_NAME", "verifier-staging")
        .with("STAGING_DB_HOST", "staging.internal");
    let config: Config = secretconf::process(&PrefixLookuper::new("STAGING_", staging))?;
    println!("{config:#?}");

    Ok(())
}
