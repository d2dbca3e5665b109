//! Fallback for misspelled keys older deployments still set

use secretconf::Lookuper;
use tracing::warn;

/// `(current key, legacy key)` pairs.
pub const LEGACY_KEYS: [(&str, &str); 3] = [
    ("COLLISION_RETRY_COUNT", "COLISSION_RETRY_COUNT"),
    ("ALLOWED_PAST_TEST_DAYS", "ALLOWRD_PAST_TEST_DAYS"),
    ("DISABLED_USER_MAX_AGE", "DIABLED_USER_MAX_AGE"),
];

/// Reads the legacy spelling of a key when the current one is unset.
///
/// The current spelling wins when both are set. Using a legacy key logs a
/// warning naming both spellings.
pub struct LegacyKeyLookuper<'a> {
    inner: &'a dyn Lookuper,
}

impl<'a> LegacyKeyLookuper<'a> {
    pub fn new(inner: &'a dyn Lookuper) -> Self {
        Self { inner }
    }
}

impl Lookuper for LegacyKeyLookuper<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(value) = self.inner.lookup(key) {
            return Some(value);
        }
        let (_, legacy) = LEGACY_KEYS.iter().find(|(current, _)| *current == key)?;
        let value = self.inner.lookup(legacy)?;
        warn!(key = %key, legacy = %legacy, "using deprecated environment variable");
        Some(value)
    }
}
