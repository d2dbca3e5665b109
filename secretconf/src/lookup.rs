//! Sources of raw environment values

use std::collections::HashMap;
use std::env;

/// Resolves an environment key to its raw value.
///
/// The decoder never touches the process environment directly; it only sees
/// a `Lookuper`, so tests and embedders can supply values from anywhere.
pub trait Lookuper {
    /// Returns the value for `key`, or `None` when it is not set.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<L: Lookuper + ?Sized> Lookuper for &L {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

impl<L: Lookuper + ?Sized> Lookuper for Box<L> {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// Looks values up in the process environment.
///
/// Variables that are set but not valid unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLookuper;

impl Lookuper for OsLookuper {
    fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// Looks values up in an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MapLookuper {
    values: HashMap<String, String>,
}

impl MapLookuper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`MapLookuper::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl<K, V> FromIterator<(K, V)> for MapLookuper
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for MapLookuper {
    type Item = (String, String);
    type IntoIter = std::collections::hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl Lookuper for MapLookuper {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl Lookuper for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Prepends a fixed prefix to every key before delegating.
///
/// `PrefixLookuper::new("APP_", OsLookuper)` makes a field keyed `PORT`
/// read `APP_PORT`.
#[derive(Debug, Clone)]
pub struct PrefixLookuper<L> {
    prefix: String,
    inner: L,
}

impl<L: Lookuper> PrefixLookuper<L> {
    pub fn new(prefix: impl Into<String>, inner: L) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }
}

impl<L: Lookuper> Lookuper for PrefixLookuper<L> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.inner.lookup(&format!("{}{}", self.prefix, key))
    }
}

/// Consults several lookupers in order; the first one that has the key wins.
#[derive(Default)]
pub struct MultiLookuper {
    lookupers: Vec<Box<dyn Lookuper + Send + Sync>>,
}

impl MultiLookuper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, lookuper: impl Lookuper + Send + Sync + 'static) -> Self {
        self.lookupers.push(Box::new(lookuper));
        self
    }
}

impl Lookuper for MultiLookuper {
    fn lookup(&self, key: &str) -> Option<String> {
        self.lookupers.iter().find_map(|l| l.lookup(key))
    }
}

impl std::fmt::Debug for MultiLookuper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiLookuper")
            .field("lookupers", &self.lookupers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_os_lookuper() {
        env::set_var("SECRETCONF_LOOKUP_TEST", "42");
        assert_eq!(
            OsLookuper.lookup("SECRETCONF_LOOKUP_TEST"),
            Some("42".to_string())
        );
        env::remove_var("SECRETCONF_LOOKUP_TEST");
        assert_eq!(OsLookuper.lookup("SECRETCONF_LOOKUP_TEST"), None);
    }

    #[test]
    fn test_map_lookuper_distinguishes_empty_from_unset() {
        let lookuper = MapLookuper::new().with("EMPTY", "");
        assert_eq!(lookuper.lookup("EMPTY"), Some(String::new()));
        assert_eq!(lookuper.lookup("UNSET"), None);
    }

    #[test]
    fn test_prefix_lookuper() {
        let inner: MapLookuper = [("APP_PORT", "9090")].into_iter().collect();
        let lookuper = PrefixLookuper::new("APP_", inner);
        assert_eq!(lookuper.lookup("PORT"), Some("9090".to_string()));
        assert_eq!(lookuper.lookup("APP_PORT"), None);
    }

    #[test]
    fn test_multi_lookuper_first_match_wins() {
        let lookuper = MultiLookuper::new()
            .push(MapLookuper::new().with("A", "first"))
            .push(MapLookuper::new().with("A", "second").with("B", "second"));
        assert_eq!(lookuper.lookup("A"), Some("first".to_string()));
        assert_eq!(lookuper.lookup("B"), Some("second".to_string()));
        assert_eq!(lookuper.lookup("C"), None);
    }
}
