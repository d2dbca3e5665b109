//! Environment configuration for the diagnosis verification server
//!
//! [`Config::new`] reads the secret manager settings, connects the selected
//! backend, decodes every server setting (resolving `secret://` references
//! on the way) and validates the result.
//!
//! ```rust,no_run
//! use verification_config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new()?;
//! let csrf_key = config.csrf_key()?;
//! println!("{} listening on {}", config.server_name, config.port);
//! # let _ = csrf_key;
//! # Ok(())
//! # }
//! ```

mod config;
mod csrf;
mod firebase;
mod legacy;

pub use config::Config;
pub use csrf::{CsrfKeyError, CSRF_KEY_LEN};
pub use firebase::{FirebaseAppConfig, FirebaseConfig};
pub use legacy::LEGACY_KEYS;
