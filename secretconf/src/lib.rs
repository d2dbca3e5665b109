//! Environment variable configuration with secret-reference resolution
//!
//! `secretconf` decodes environment variables into typed structs and lets any
//! value be a reference to an externally stored secret. A value such as
//! `secret://projects/p/secrets/signing-key` is replaced by the secret's
//! plaintext before it is converted to the field's type.
//!
//! # Features
//!
//! - **Declarative**: one `#[env(...)]` attribute per field with `#[derive(EnvConfig)]`
//! - **Secret references**: `secret://` values resolved through a pluggable [`SecretStore`]
//! - **Caching**: optional TTL cache in front of the secret store
//! - **Two-phase bootstrap**: the secret store is configured from the environment first
//! - **Mutators**: rewrite any value between lookup and conversion
//! - **File-based secrets**: `{VAR}_FILE` fallback for Kubernetes/Docker mounted files
//! - **Validation**: post-decode invariant checks through [`Finalize`]
//!
//! # Value Parsing
//!
//! - Strings: `DATABASE_URL=postgres://localhost/db`
//! - Integers: `MAX_CONNECTIONS=42`, `MASK=0xff`
//! - Booleans: `DEBUG=true` (also `1`, `t`, `TRUE`, `0`, `f`, `FALSE`, ...)
//! - Durations: `TIMEOUT=1h30m`, `GRACE=-5s`, `RETRY=0`, `WINDOW=1.5h`
//!
//! # Example
//!
//! ```rust
//! use secretconf::{EnvConfig, MapLookuper};
//! use chrono::TimeDelta;
//!
//! #[derive(Debug, Default, EnvConfig)]
//! struct Config {
//!     #[env(required)]
//!     pub api_key: String,
//!
//!     #[env(default = "8080")]
//!     pub port: u16,
//!
//!     #[env(name = "REQUEST_TIMEOUT", default = "30s")]
//!     pub timeout: TimeDelta,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let env = MapLookuper::new().with("API_KEY", "test-key");
//! let config: Config = secretconf::process(&env)?;
//! assert_eq!(config.api_key, "test-key");
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.timeout, TimeDelta::seconds(30));
//! #     Ok(())
//! # }
//! ```
//!
//! # Secret references
//!
//! [`Bootstrap`] first reads `SECRET_MANAGER`, `SECRET_CACHE_TTL` and
//! `SECRETS_DIR`, builds the selected store, then decodes the configuration
//! with a [`SecretResolver`] in the mutator chain.
//!
//! ```rust
//! use std::sync::Arc;
//! use secretconf::{Bootstrap, EnvConfig, Finalize, InMemorySecretStore, MapLookuper, SecretStoreRegistry};
//!
//! #[derive(Debug, Default, EnvConfig)]
//! struct Config {
//!     #[env(required)]
//!     pub token_signing_key: String,
//! }
//!
//! impl Finalize for Config {}
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = InMemorySecretStore::new().with_secret("projects/p/secrets/s", "abc123");
//! let registry = SecretStoreRegistry::empty().with_store("STUB", Arc::new(store));
//! let env = MapLookuper::new()
//!     .with("SECRET_MANAGER", "STUB")
//!     .with("TOKEN_SIGNING_KEY", "secret://projects/p/secrets/s");
//!
//! let config: Config = Bootstrap::new(&env).registry(registry).load()?;
//! assert_eq!(config.token_signing_key, "abc123");
//! #     Ok(())
//! # }
//! ```
//!
//! # Attributes
//!
//! ## `#[env(name = "CUSTOM_NAME")]`
//!
//! Read a variable other than the upper-cased field name.
//!
//! ## `#[env(default = "literal")]`
//!
//! Used when the variable is unset. The literal goes through the same
//! mutators and conversion as a real value.
//!
//! ## `#[env(required)]`
//!
//! Fail with [`ConfError::Missing`] when the variable is unset. Cannot be
//! combined with `default`. Fields that are neither required nor defaulted
//! keep their `Default` value.
//!
//! ## `#[env(from_file)]`
//!
//! Fall back to reading the file named by `{VAR}_FILE`.
//!
//! ## `#[env(nested)]` / `#[env(nested, prefix = "DB_")]`
//!
//! Decode a field whose type also derives `EnvConfig`, optionally prefixing
//! all of its keys.
//!
//! ## `#[env(skip)]`
//!
//! Leave the field at its `Default` value.
//!
//! ## `#[env(prefix = "APP_")]` on the struct
//!
//! Prefix every key of the struct.

// Lets the derive's `::secretconf::` paths resolve inside this crate.
extern crate self as secretconf;

pub mod bootstrap;
pub mod de;
mod decode;
mod error;
mod field;
mod lookup;
mod mutate;
mod resolver;
pub mod secrets;
pub mod validate;

pub use bootstrap::{load, load_with, Bootstrap, BootstrapError, Finalize, SecretsConfig, Stage};
pub use decode::{process, process_with, Decoder};
pub use error::ConfError;
pub use field::{AssignFn, EnvConfig, EnvValue, Field, FieldKind, FieldSpec, NestedFn, Scalar};
pub use lookup::{Lookuper, MapLookuper, MultiLookuper, OsLookuper, PrefixLookuper};
pub use mutate::{MutateError, Mutator, Mutators, Value};
pub use resolver::{SecretResolver, RESOLVED_DIR};
pub use secrets::{
    CachedSecretStore, FileSecretStore, InMemorySecretStore, SecretError, SecretReference,
    SecretStore, SecretStoreRegistry,
};
pub use secretconf_derive::EnvConfig;
pub use validate::ValidationError;

// Re-export for application code and custom mutators
pub use anyhow;
