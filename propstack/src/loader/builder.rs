//! Builder for load sessions.
//!
//! The builder lets applications customise resource locations, reserved keys,
//! the override flag and the fallback source before producing a [`Loader`].

use std::path::PathBuf;

use super::{Loader, LoaderOptions};
use crate::fallback::{PropertySource, SystemProperties};

/// Builder for [`Loader`].
///
/// # Examples
///
/// ```rust
/// use propstack::{Loader, SystemProperties};
///
/// let loader = Loader::builder()
///     .resource_dir("conf")
///     .base_name("service")
///     .fallback(SystemProperties::new().with("config.profiles.active", "dev"))
///     .args(["-p", "override.yaml"])
///     .build();
/// assert_eq!(loader.options().base_name, "service");
/// assert_eq!(loader.active_profiles(), ["dev"]);
/// ```
pub struct LoaderBuilder {
    options: LoaderOptions,
    fallback: Option<Box<dyn PropertySource>>,
    args: Vec<String>,
}

impl std::fmt::Debug for LoaderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderBuilder")
            .field("options", &self.options)
            .field("custom_fallback", &self.fallback.is_some())
            .field("args", &self.args)
            .finish()
    }
}

impl Default for LoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderBuilder {
    /// Creates a builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: LoaderOptions::default(),
            fallback: None,
            args: Vec::new(),
        }
    }

    /// Sets the directory bundled resources are resolved under.
    #[must_use]
    pub fn resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.resource_dir = dir.into();
        self
    }

    /// Sets the stem of main and profile source names (`application`).
    #[must_use]
    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.options.base_name = name.into();
        self
    }

    /// Sets the key holding the active profile list.
    #[must_use]
    pub fn profiles_key(mut self, key: impl Into<String>) -> Self {
        self.options.profiles_key = key.into();
        self
    }

    /// Sets the command-line flag naming override files (`-p`).
    #[must_use]
    pub fn override_flag(mut self, flag: impl Into<String>) -> Self {
        self.options.override_flag = flag.into();
        self
    }

    /// Sets the key listing further local files (`load.properties`).
    #[must_use]
    pub fn indirection_key(mut self, key: impl Into<String>) -> Self {
        self.options.indirection_key = key.into();
        self
    }

    /// Replaces the fallback source consulted during resolution.
    #[must_use]
    pub fn fallback(mut self, source: impl PropertySource + 'static) -> Self {
        self.fallback = Some(Box::new(source));
        self
    }

    /// Supplies the command-line arguments scanned by [`Loader::load`].
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the loader, defaulting the fallback to [`SystemProperties`].
    #[must_use]
    pub fn build(self) -> Loader {
        let fallback: Box<dyn PropertySource> = match self.fallback {
            Some(source) => source,
            None => Box::new(SystemProperties::new()),
        };
        Loader::from_parts(self.options, fallback, self.args)
    }
}
