//! `secret://` references

use std::fmt;

/// Scheme prefix that marks a value as a reference into the secret store.
pub const SECRET_SCHEME: &str = "secret://";

const TARGET_FILE_SUFFIX: &str = "?target=file";

/// Where a resolved secret ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretTarget {
    /// The plaintext replaces the field value.
    Value,
    /// The plaintext is written to a file and the field holds the file path.
    File,
}

/// A value naming a secret to fetch rather than a literal.
///
/// `secret://projects/p/secrets/s` carries the locator
/// `projects/p/secrets/s`; appending `?target=file` asks for the plaintext
/// to be written to disk instead of substituted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretReference {
    raw: String,
    locator: String,
    target: SecretTarget,
}

impl SecretReference {
    /// Parse `raw` if it carries the secret scheme.
    ///
    /// Returns `None` for plain values, including `secret://` with an empty
    /// locator.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(SECRET_SCHEME)?;
        let (locator, target) = match rest.strip_suffix(TARGET_FILE_SUFFIX) {
            Some(locator) => (locator, SecretTarget::File),
            None => (rest, SecretTarget::Value),
        };
        if locator.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            locator: locator.to_string(),
            target,
        })
    }

    /// The backend-specific part after the scheme.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn target(&self) -> SecretTarget {
        self.target
    }

    /// The reference exactly as it appeared in the environment.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Debug for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretReference")
            .field("locator", &self.locator)
            .field("target", &self.target)
            .finish()
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
