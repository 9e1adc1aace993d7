//! External property sources consulted when a placeholder key is not in the
//! loaded map.
//!
//! The engine only ever reads from these sources. Lookups are performed live,
//! so a host that mutates the environment between sessions sees the new
//! values in the next evaluation.

use std::collections::HashMap;
use std::env;
use std::hash::BuildHasher;

use indexmap::IndexMap;

/// Read-only key lookup used as the fallback during placeholder resolution.
pub trait PropertySource {
    /// Returns the value for `key`, if the source defines one.
    fn property(&self, key: &str) -> Option<String>;
}

impl<S: BuildHasher> PropertySource for HashMap<String, String, S> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<S: BuildHasher> PropertySource for IndexMap<String, String, S> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<F> PropertySource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn property(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// A source that never yields a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl PropertySource for NoFallback {
    fn property(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Process-level properties: host overrides, the environment and a few
/// built-in `user.*` keys.
///
/// Lookup order for `key`:
/// 1. values registered with [`SystemProperties::set`];
/// 2. the environment variable named exactly `key`;
/// 3. the environment variable named by upper-casing `key` and replacing `.`
///    and `-` with `_` (so `server.port` also matches `SERVER_PORT`);
/// 4. `user.home`, `user.name` and `user.dir`, derived from the platform.
///
/// # Examples
///
/// ```
/// use propstack::{PropertySource, SystemProperties};
///
/// let props = SystemProperties::new().with("server.port", "9876");
/// assert_eq!(props.property("server.port").as_deref(), Some("9876"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemProperties {
    overrides: IndexMap<String, String>,
}

impl SystemProperties {
    /// Creates a source with no host overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a host override, returning the updated source.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Registers a host override that shadows the environment for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(key.into(), value.into());
    }

    /// Removes a host override, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.overrides.shift_remove(key)
    }

    fn env_var(key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn env_style_key(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }

    fn builtin(key: &str) -> Option<String> {
        match key {
            "user.home" => dirs::home_dir().map(|p| p.to_string_lossy().into_owned()),
            "user.name" => Self::env_var("USER").or_else(|| Self::env_var("USERNAME")),
            "user.dir" => env::current_dir()
                .ok()
                .map(|p| p.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

impl PropertySource for SystemProperties {
    fn property(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.clone());
        }
        if key.is_empty() {
            return None;
        }
        Self::env_var(key)
            .or_else(|| {
                let env_key = Self::env_style_key(key);
                (env_key != key)
                    .then(|| Self::env_var(&env_key))
                    .flatten()
            })
            .or_else(|| Self::builtin(key))
    }
}

#[cfg(test)]
mod tests {
    use super::{NoFallback, PropertySource, SystemProperties};
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use test_helpers::with_jail;

    #[rstest]
    fn overrides_shadow_environment() -> Result<()> {
        with_jail(|j| {
            j.set_env("APP_MODE", "env");
            let props = SystemProperties::new().with("APP_MODE", "override");
            assert_eq!(props.property("APP_MODE").as_deref(), Some("override"));
            Ok(())
        })
    }

    #[rstest]
    #[case("eureka.instance.hostname", "eureka.instance.hostname")]
    #[case("eureka.instance.hostname", "EUREKA_INSTANCE_HOSTNAME")]
    #[case("server-port", "SERVER_PORT")]
    fn reads_environment_variants(#[case] key: &str, #[case] env_name: &str) -> Result<()> {
        let value = with_jail(|j| {
            j.set_env(env_name, "host1");
            Ok(SystemProperties::new().property(key))
        })?;
        ensure!(value.as_deref() == Some("host1"), "got {value:?} for {key}");
        Ok(())
    }

    #[rstest]
    fn user_dir_reflects_working_directory() -> Result<()> {
        with_jail(|_| {
            let dir = SystemProperties::new().property("user.dir");
            let expected = std::env::current_dir()
                .map_err(test_helpers::figment_error)?
                .to_string_lossy()
                .into_owned();
            assert_eq!(dir.as_deref(), Some(expected.as_str()));
            Ok(())
        })
    }

    #[rstest]
    fn removed_override_falls_through() {
        let mut props = SystemProperties::new().with("propstack.test.unset.key", "x");
        assert_eq!(props.remove("propstack.test.unset.key").as_deref(), Some("x"));
        assert_eq!(props.property("propstack.test.unset.key"), None);
    }

    #[rstest]
    fn closures_and_maps_are_sources() {
        let lookup = |key: &str| (key == "a").then(|| String::from("1"));
        assert_eq!(lookup.property("a").as_deref(), Some("1"));
        let map: std::collections::HashMap<String, String> =
            [(String::from("b"), String::from("2"))].into_iter().collect();
        assert_eq!(map.property("b").as_deref(), Some("2"));
        assert_eq!(NoFallback.property("a"), None);
    }
}
