//! Basic usage example

use chrono::TimeDelta;
use secretconf::EnvConfig;

#[derive(Debug, Default, EnvConfig)]
struct Config {
    // Required field: loaded from DATABASE_URL environment variable
    #[env(required)]
    pub database_url: String,

    // With default value
    #[env(default = "127.0.0.1:8080")]
    pub server_addr: String,

    // Numeric type, hex and underscores are accepted too
    #[env(default = 10)]
    pub max_connections: u32,

    // Boolean type: 1, t, true, TRUE, 0, f, false, FALSE, ...
    pub debug_mode: bool,

    // Signed duration
    #[env(name = "REQUEST_TIMEOUT", default = "30s")]
    pub timeout: TimeDelta,
}

fn main() -> anyhow::Result<()> {
    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");
    std::env::set_var("DEBUG_MODE", "t");
    std::env::set_var("REQUEST_TIMEOUT", "1m30s");

    // No secret references, so the plain decoder is enough
    let config: Config = secretconf::process(&secretconf::OsLookuper)?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Max Connections: {}", config.max_connections);
    println!("  Debug Mode: {}", config.debug_mode);
    println!("  Timeout: {}s", config.timeout.num_seconds());

    Ok(())
}
