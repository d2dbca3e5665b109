//! Value mutators applied between lookup and type conversion

use std::fmt;

use crate::field::FieldSpec;
use crate::secrets::{SecretError, SecretReference};

/// A raw field value as it flows through the mutator pipeline.
///
/// Raw strings are classified once, before the first mutator runs, so
/// mutators match on the variant instead of re-checking prefixes.
#[derive(Clone, PartialEq, Eq)]
pub enum Value {
    Plain(String),
    Secret(SecretReference),
}

impl Value {
    /// Classify a raw environment string.
    pub fn classify(raw: String) -> Self {
        match SecretReference::parse(&raw) {
            Some(reference) => Self::Secret(reference),
            None => Self::Plain(raw),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret(_))
    }

    /// The text handed to type conversion. An unresolved reference converts
    /// as its literal `secret://...` form.
    pub fn into_raw(self) -> String {
        match self {
            Self::Plain(s) => s,
            Self::Secret(r) => r.into_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain(..)"),
            Self::Secret(r) => f.debug_tuple("Secret").field(r).finish(),
        }
    }
}

/// Errors returned by mutators.
#[derive(Debug, thiserror::Error)]
pub enum MutateError {
    /// The secret store could not produce a value for the locator.
    #[error("failed to resolve secret '{locator}': {source}")]
    SecretResolution {
        /// Locator of the reference, never the plaintext
        locator: String,
        /// Error reported by the secret store
        source: SecretError,
    },

    /// The resolved secret could not be written to its target file.
    #[error("failed to write secret '{locator}' to '{path}': {source}")]
    SecretFile {
        /// Locator of the reference
        locator: String,
        /// File the plaintext was being written to
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Any other mutator failure.
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

/// Rewrites a field value after lookup and before conversion.
///
/// Mutators run in registration order; returning the value unchanged is
/// the way to opt out for a field. Closures with the matching signature
/// implement this trait.
pub trait Mutator: Send + Sync {
    fn mutate(&self, field: &FieldSpec, value: Value) -> Result<Value, MutateError>;
}

impl<F> Mutator for F
where
    F: Fn(&FieldSpec, Value) -> Result<Value, MutateError> + Send + Sync,
{
    fn mutate(&self, field: &FieldSpec, value: Value) -> Result<Value, MutateError> {
        self(field, value)
    }
}

/// An ordered set of mutators.
pub type Mutators = Vec<Box<dyn Mutator>>;
