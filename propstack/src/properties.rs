//! The resolved, read-only result of a load session.
//!
//! [`Properties`] is a flat string map. It also implements
//! [`figment::Provider`], nesting dotted keys into dictionaries so callers
//! that want typed values can extract them with figment.

use figment::{
    Figment, Metadata, Profile, Provider,
    error::Error,
    util::nest,
    value::{Dict, Map, Value},
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::fallback::PropertySource;
use crate::map::ConfigMap;
use crate::{PropsError, PropsResult};
use std::sync::Arc;

/// Flat map of fully resolved property values in last-write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    /// Returns the resolved value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` when `key` has a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in last-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the snapshot, returning the ordered entries.
    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, String> {
        self.entries
    }

    /// Deserializes the properties into `T`, nesting dotted keys.
    ///
    /// # Errors
    ///
    /// Returns [`PropsError::Gathering`] when the values do not fit `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use propstack::{ConfigMap, NoFallback, Properties};
    ///
    /// #[derive(serde::Deserialize)]
    /// struct Server { port: u16 }
    /// #[derive(serde::Deserialize)]
    /// struct App { server: Server }
    ///
    /// let map: ConfigMap = [("server.port", "8080")].into_iter().collect();
    /// let props = Properties::resolve(&map, &NoFallback);
    /// let app: App = props.extract()?;
    /// assert_eq!(app.server.port, 8080);
    /// # Ok::<(), std::sync::Arc<propstack::PropsError>>(())
    /// ```
    pub fn extract<T: DeserializeOwned>(&self) -> PropsResult<T> {
        Figment::from(self.clone())
            .extract()
            .map_err(|e| Arc::new(PropsError::gathering(e)))
    }

    /// Resolves every placeholder in `map` into a new snapshot.
    #[must_use]
    pub fn resolve(map: &ConfigMap, fallback: &dyn PropertySource) -> Self {
        crate::placeholder::resolve_map(map, fallback).into()
    }

    /// Parse a raw string the way figment parses environment values, so
    /// `8080` and `true` become typed scalars.
    fn parse_value(raw: &str) -> Value {
        raw.parse().unwrap_or_else(|_| Value::from(raw.to_owned()))
    }
}

/// Merge `incoming` into `target`, descending into dictionaries present on
/// both sides. Any other collision keeps the incoming value.
fn merge_dict(target: &mut Dict, incoming: Dict) {
    for (key, value) in incoming {
        match value {
            Value::Dict(tag, nested) => match target.get_mut(&key) {
                Some(Value::Dict(_, existing)) => merge_dict(existing, nested),
                _ => {
                    target.insert(key, Value::Dict(tag, nested));
                }
            },
            other => {
                target.insert(key, other);
            }
        }
    }
}

impl From<IndexMap<String, String>> for Properties {
    fn from(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Provider for Properties {
    fn metadata(&self) -> Metadata {
        Metadata::named("propstack properties")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();
        for (key, raw) in &self.entries {
            let Some(nested) = nest(key, Self::parse_value(raw)).into_dict() else {
                return Err(Error::from(format!(
                    "property key `{key}` produced a non-object value"
                )));
            };
            merge_dict(&mut dict, nested);
        }
        Ok(Profile::Default.collect(dict))
    }
}

#[cfg(test)]
mod tests {
    use super::Properties;
    use anyhow::{Result, anyhow, ensure};
    use indexmap::IndexMap;
    use rstest::rstest;
    use serde::Deserialize;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<IndexMap<_, _>>()
            .into()
    }

    #[derive(Debug, Deserialize)]
    struct Service {
        name: String,
        port: u16,
        enabled: bool,
    }

    #[derive(Debug, Deserialize)]
    struct Services {
        service1: Service,
    }

    #[derive(Debug, Deserialize)]
    struct Root {
        service: Services,
    }

    #[rstest]
    fn extracts_nested_typed_values() -> Result<()> {
        let p = props(&[
            ("service.service1.name", "foo-service1"),
            ("service.service1.port", "8080"),
            ("service.service1.enabled", "true"),
        ]);
        let root: Root = p.extract().map_err(|e| anyhow!(e.to_string()))?;
        ensure!(root.service.service1.name == "foo-service1", "name mismatch");
        ensure!(root.service.service1.port == 8080, "port mismatch");
        ensure!(root.service.service1.enabled, "enabled mismatch");
        Ok(())
    }

    #[rstest]
    fn later_scalar_replaces_earlier_table() -> Result<()> {
        let p = props(&[("a.b", "1"), ("a", "flat")]);
        let value: String = figment::Figment::from(p)
            .extract_inner("a")
            .map_err(|e| anyhow!(e.to_string()))?;
        ensure!(value == "flat", "got {value}");
        Ok(())
    }

    #[rstest]
    fn sibling_keys_share_a_table() -> Result<()> {
        let p = props(&[("a.x", "1"), ("b", "2"), ("a.y", "3")]);
        let table: IndexMap<String, u8> = figment::Figment::from(p)
            .extract_inner("a")
            .map_err(|e| anyhow!(e.to_string()))?;
        ensure!(table.len() == 2, "expected both keys, got {table:?}");
        Ok(())
    }

    #[rstest]
    fn type_mismatch_is_gathering_error() {
        let p = props(&[("service.service1.name", "x"), ("service.service1.port", "high")]);
        let err = p.extract::<Root>().expect_err("port is not numeric");
        assert!(matches!(err.as_ref(), crate::PropsError::Gathering(_)));
    }

    #[rstest]
    fn accessors_follow_entries() {
        let p = props(&[("k", "v")]);
        assert_eq!(p.get("k"), Some("v"));
        assert!(p.contains_key("k"));
        assert_eq!(p.len(), 1);
        assert!(!p.is_empty());
        assert_eq!(p.iter().collect::<Vec<_>>(), [("k", "v")]);
    }
}
