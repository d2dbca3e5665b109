//! Secret stores
//!
//! A [`SecretStore`] turns a locator (the part of a `secret://` reference
//! after the scheme) into plaintext. Backends are chosen at bootstrap by a
//! type tag through the [`SecretStoreRegistry`]; any store can be wrapped in
//! a [`CachedSecretStore`] to memoize lookups for a TTL.

mod cache;
mod file;
mod memory;
mod reference;
mod registry;

use std::fmt::Debug;
use std::sync::Arc;

pub use cache::CachedSecretStore;
pub use file::FileSecretStore;
pub use memory::InMemorySecretStore;
pub use reference::{SecretReference, SecretTarget, SECRET_SCHEME};
pub use registry::{SecretStoreFactory, SecretStoreRegistry};

/// Errors produced by secret stores.
///
/// Messages carry the locator only, never plaintext.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// The backend has no secret under the locator.
    #[error("secret '{locator}' not found")]
    NotFound {
        /// Locator that was requested
        locator: String,
    },

    /// The secret exists but could not be read.
    #[error("failed to read secret '{locator}': {source}")]
    Io {
        /// Locator that was requested
        locator: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Any other backend failure, including rejected locators.
    #[error("secret backend error for '{locator}': {message}")]
    Backend {
        /// Locator that was requested
        locator: String,
        /// Backend-specific reason
        message: String,
    },
}

impl SecretError {
    pub fn not_found(locator: impl Into<String>) -> Self {
        Self::NotFound {
            locator: locator.into(),
        }
    }

    pub fn backend(locator: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Backend {
            locator: locator.into(),
            message: message.to_string(),
        }
    }
}

/// Fetches plaintext for a locator.
///
/// Calls block until the backend answers. Implementations must be safe to
/// share between threads; retries, if any, belong inside the backend.
pub trait SecretStore: Send + Sync + Debug {
    fn resolve(&self, locator: &str) -> Result<String, SecretError>;
}

impl<S: SecretStore + ?Sized> SecretStore for Arc<S> {
    fn resolve(&self, locator: &str) -> Result<String, SecretError> {
        (**self).resolve(locator)
    }
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
    fn resolve(&self, locator: &str) -> Result<String, SecretError> {
        (**self).resolve(locator)
    }
}
