//! Error types for environment variable configuration

use crate::mutate::MutateError;
use crate::secrets::SecretError;
use crate::validate::ValidationError;

/// Errors that can occur when loading configuration from environment variables.
///
/// Every variant is terminal: a struct whose decode returned one of these
/// must be discarded, even though some of its fields may already be set.
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
    /// Required environment variable is not set.
    ///
    /// Occurs when a field marked `required` has no value in the lookuper
    /// (nor in `{VAR}_FILE` for `from_file` fields).
    #[error("Environment variable '{name}' is required but not set")]
    Missing {
        /// Name of the missing environment variable
        name: String,
    },

    /// Failed to read from a file specified by `{VAR}_FILE` environment variable.
    #[error("Failed to read file '{path}' for environment variable '{name}': {source}")]
    FileRead {
        /// Name of the `{VAR}_FILE` environment variable (e.g., "API_KEY_FILE")
        name: String,
        /// Path to the file that failed to be read
        path: String,
        /// Underlying I/O error that caused the failure
        source: std::io::Error,
    },

    /// Failed to convert the (possibly mutated) value into the field's type.
    #[error(
        "Failed to parse environment variable '{name}' as {type_name}{}: {message}",
        display_value(.value)
    )]
    Parse {
        /// Name of the environment variable being parsed
        name: String,
        /// Semantic kind or Rust type that parsing was attempted for
        type_name: String,
        /// Raw value, `None` when it came from a resolved secret
        value: Option<String>,
        /// Error message from the converter
        message: String,
    },

    /// A mutator rejected the value of a field.
    #[error("Failed to process environment variable '{name}': {source}")]
    Mutate {
        /// Name of the environment variable whose value was being mutated
        name: String,
        /// Error returned by the mutator
        source: MutateError,
    },

    /// A field table declares a field both required and defaulted.
    #[error("Environment variable '{name}' cannot be both required and have a default")]
    Conflict {
        /// Name of the misdeclared environment variable
        name: String,
    },

    /// The secret manager type tag has no registered backend.
    #[error("Unsupported secret manager type '{kind}'")]
    UnsupportedBackend {
        /// The tag that was requested
        kind: String,
    },

    /// A secret store backend could not be constructed.
    #[error("Failed to create secret manager '{kind}': {source}")]
    SecretStore {
        /// The tag of the backend being constructed
        kind: String,
        /// Construction failure reported by the backend factory
        source: SecretError,
    },

    /// The decoded configuration violates a semantic invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn display_value(value: &Option<String>) -> String {
    match value {
        Some(v) => format!(" (value '{v}')"),
        None => String::new(),
    }
}

impl ConfError {
    /// Create a parse error for a Rust target type
    pub fn parse_error<T>(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            name: name.into(),
            type_name: std::any::type_name::<T>().to_string(),
            value: None,
            message: message.to_string(),
        }
    }

    /// Create a missing environment variable error
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    /// Name of the environment variable the error is about, if any.
    pub fn env_name(&self) -> Option<&str> {
        match self {
            Self::Missing { name }
            | Self::FileRead { name, .. }
            | Self::Parse { name, .. }
            | Self::Mutate { name, .. }
            | Self::Conflict { name } => Some(name),
            Self::Validation(ValidationError::NegativeDuration { name, .. })
            | Self::Validation(ValidationError::Invalid { name, .. }) => Some(name),
            Self::UnsupportedBackend { .. } | Self::SecretStore { .. } => None,
        }
    }
}
