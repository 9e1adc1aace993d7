//! The ordered key-value map accumulated during one load session.
//!
//! Writes follow last-write-wins: re-inserting an existing key replaces its
//! value and moves the entry to the end, so iteration order always reflects
//! the order in which values were last written.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;

/// Where a loaded value came from.
///
/// The origin decides how a path is resolved and how its absence is
/// treated: every kind is silently skipped when missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A resource bundled with the application, resolved under the
    /// configured resource directory.
    BundledResource,
    /// A file on the local filesystem, resolved against the working
    /// directory.
    LocalFile,
    /// A local file named by the command-line override flag.
    CommandLine,
    /// A local file named through the external fallback source, such as an
    /// environment variable holding the indirection key.
    Environment,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BundledResource => "resource",
            Self::LocalFile => "file",
            Self::CommandLine => "command line",
            Self::Environment => "environment",
        };
        f.write_str(name)
    }
}

/// A source that contributed entries to a [`ConfigMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path as resolved on disk.
    pub path: PathBuf,
    /// Kind of source the path was requested as.
    pub origin: Origin,
}

/// Ordered string map with explicit last-write-wins semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    entries: IndexMap<String, String>,
}

impl ConfigMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` under `key`, replacing any earlier value and moving the
    /// entry to the end of the iteration order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let owned = key.into();
        self.entries.shift_remove(&owned);
        self.entries.insert(owned, value.into());
    }

    /// Writes every pair from `pairs` in order.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.insert(key, value);
        }
    }

    /// Returns the raw value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` when `key` has a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no key has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in last-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the map, returning the underlying ordered entries.
    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, String> {
        self.entries
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigMap;
    use rstest::rstest;

    #[rstest]
    fn later_write_replaces_value() {
        let mut map = ConfigMap::new();
        map.insert("app.name", "first");
        map.insert("app.name", "second");
        assert_eq!(map.get("app.name"), Some("second"));
        assert_eq!(map.len(), 1);
    }

    #[rstest]
    fn rewrite_moves_entry_to_end() {
        let map: ConfigMap = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[rstest]
    fn empty_map_reports_empty() {
        let map = ConfigMap::new();
        assert!(map.is_empty());
        assert!(!map.contains_key("missing"));
    }
}
