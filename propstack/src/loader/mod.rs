//! The load session: one ordered map filled from successive sources.
//!
//! A [`Loader`] owns its [`ConfigMap`] exclusively. Sources are appended in
//! the order the caller loads them and later entries replace earlier ones;
//! [`Loader::eval`] then resolves placeholders into a [`Properties`]
//! snapshot. [`Loader::load`] runs the conventional order in one call.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::PropsResult;
use crate::fallback::PropertySource;
use crate::file::{Format, read_pairs};
use crate::map::{ConfigMap, Origin, SourceEntry};
use crate::paths::split_paths;
use crate::placeholder::Evaluator;
use crate::properties::Properties;

mod builder;

pub use builder::LoaderBuilder;

/// Names and keys that steer a load session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Directory bundled resources are resolved under.
    pub resource_dir: PathBuf,
    /// Stem of the main and profile-specific source names.
    pub base_name: String,
    /// Key holding the active profile list.
    pub profiles_key: String,
    /// Command-line flag whose value lists override files.
    pub override_flag: String,
    /// Key whose value lists further local files to load.
    pub indirection_key: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("resources"),
            base_name: String::from("application"),
            profiles_key: String::from("config.profiles.active"),
            override_flag: String::from("-p"),
            indirection_key: String::from("load.properties"),
        }
    }
}

/// Accumulates property sources for one session.
///
/// # Examples
///
/// ```rust,no_run
/// use propstack::{Loader, Origin};
///
/// # fn run() -> propstack::PropsResult<()> {
/// let mut loader = Loader::new();
/// loader.load_properties("application.properties", Origin::BundledResource)?;
/// loader.load_yaml("application.yaml", Origin::BundledResource)?;
/// loader.load_via_command_line(std::env::args())?;
/// let props = loader.eval();
/// println!("{:?}", props.get("app.name"));
/// # Ok(())
/// # }
/// ```
pub struct Loader {
    map: ConfigMap,
    sources: Vec<SourceEntry>,
    options: LoaderOptions,
    fallback: Box<dyn PropertySource>,
    args: Vec<String>,
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("map", &self.map)
            .field("sources", &self.sources)
            .field("options", &self.options)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Loader {
    /// Creates a loader with default options and
    /// [`SystemProperties`](crate::SystemProperties) as the fallback source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a [`LoaderBuilder`].
    #[must_use]
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::new()
    }

    pub(crate) fn from_parts(
        options: LoaderOptions,
        fallback: Box<dyn PropertySource>,
        args: Vec<String>,
    ) -> Self {
        Self {
            map: ConfigMap::new(),
            sources: Vec::new(),
            options,
            fallback,
            args,
        }
    }

    /// Options this session was built with.
    #[must_use]
    pub const fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Raw, unresolved entries loaded so far.
    #[must_use]
    pub const fn map(&self) -> &ConfigMap {
        &self.map
    }

    /// Sources that contributed entries, in load order.
    #[must_use]
    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    /// Number of distinct keys loaded so far.
    #[must_use]
    pub fn size(&self) -> usize {
        self.map.len()
    }

    /// The external fallback consulted for keys missing from the map.
    #[must_use]
    pub fn fallback(&self) -> &dyn PropertySource {
        self.fallback.as_ref()
    }

    /// Writes one entry directly, as the highest-precedence layer so far.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key, value);
    }

    fn resolve_path(&self, path: &Path, origin: Origin) -> PathBuf {
        match origin {
            Origin::BundledResource => self.options.resource_dir.join(path),
            Origin::LocalFile | Origin::CommandLine | Origin::Environment => path.to_path_buf(),
        }
    }

    fn load_format(&mut self, path: &Path, origin: Origin, format: Format) -> PropsResult<bool> {
        let resolved = self.resolve_path(path, origin);
        let Some(pairs) = read_pairs(&resolved, format)? else {
            debug!(path = %resolved.display(), %origin, "source absent; skipping");
            return Ok(false);
        };
        debug!(
            path = %resolved.display(),
            %origin,
            entries = pairs.len(),
            "loaded source"
        );
        self.map.extend(pairs);
        self.sources.push(SourceEntry {
            path: resolved,
            origin,
        });
        Ok(true)
    }

    /// Loads a `.properties` source if it exists.
    ///
    /// Returns `Ok(false)` when the source is absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the source exists but cannot be read or parsed.
    pub fn load_properties(&mut self, path: impl AsRef<Path>, origin: Origin) -> PropsResult<bool> {
        self.load_format(path.as_ref(), origin, Format::Properties)
    }

    /// Loads a YAML source if it exists, flattening nested mappings into
    /// dotted keys.
    ///
    /// Returns `Ok(false)` when the source is absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the source exists but cannot be read or parsed.
    pub fn load_yaml(&mut self, path: impl AsRef<Path>, origin: Origin) -> PropsResult<bool> {
        self.load_format(path.as_ref(), origin, Format::Yaml)
    }

    /// Loads a local file with the adapter its suffix selects. Files with an
    /// unrecognised suffix are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_file_with_extension_check(&mut self, path: impl AsRef<Path>) -> PropsResult<bool> {
        self.load_file_as(path.as_ref(), Origin::LocalFile)
    }

    pub(crate) fn load_file_as(&mut self, path: &Path, origin: Origin) -> PropsResult<bool> {
        match Format::from_path(path) {
            Format::Unrecognized => {
                debug!(path = %path.display(), %origin, "unrecognised suffix; skipping");
                Ok(false)
            }
            format => self.load_format(path, origin, format),
        }
    }

    /// Loads `<base>.properties`, `<base>.yaml` and `<base>.yml` from
    /// `origin`, returning how many were found.
    ///
    /// # Errors
    ///
    /// Returns the first read or parse failure.
    pub fn load_main(&mut self, origin: Origin) -> PropsResult<usize> {
        let base = self.options.base_name.clone();
        self.load_named(&base, origin)
    }

    pub(crate) fn load_named(&mut self, stem: &str, origin: Origin) -> PropsResult<usize> {
        let mut found = 0;
        if self.load_properties(format!("{stem}.properties"), origin)? {
            found += 1;
        }
        for suffix in ["yaml", "yml"] {
            if self.load_yaml(format!("{stem}.{suffix}"), origin)? {
                found += 1;
            }
        }
        Ok(found)
    }

    /// Loads the local files listed under the indirection key.
    ///
    /// The key is looked up like a placeholder: the map first, then the
    /// fallback source. Paths named only by the fallback are recorded with
    /// [`Origin::Environment`].
    ///
    /// # Errors
    ///
    /// Returns the first read or parse failure.
    pub fn load_via_indirection(&mut self) -> PropsResult<()> {
        let key = self.options.indirection_key.clone();
        let origin = if self.map.contains_key(&key) {
            Origin::LocalFile
        } else {
            Origin::Environment
        };
        let Some(listed) = self.lookup(&key) else {
            return Ok(());
        };
        for token in split_paths(&listed) {
            self.load_file_as(Path::new(token), origin)?;
        }
        Ok(())
    }

    /// Resolves `key` against the entries loaded so far and the fallback.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        Evaluator::new(&self.map, self.fallback.as_ref()).lookup(key)
    }

    /// Resolves every placeholder, producing the session's result. The raw
    /// map is left untouched, so loading may continue afterwards.
    #[must_use]
    pub fn eval(&self) -> Properties {
        Properties::resolve(&self.map, self.fallback.as_ref())
    }

    /// Runs a complete session in the conventional order:
    ///
    /// 1. bundled main resources;
    /// 2. bundled profile overlays for the active profiles;
    /// 3. local main files in the working directory;
    /// 4. local files named by the indirection key;
    /// 5. command-line overrides from the arguments given to the builder;
    /// 6. placeholder resolution.
    ///
    /// # Errors
    ///
    /// Returns the first source that exists but fails to read or parse.
    pub fn load(mut self) -> PropsResult<Properties> {
        self.load_main(Origin::BundledResource)?;
        self.load_via_profiles()?;
        self.load_main(Origin::LocalFile)?;
        self.load_via_indirection()?;
        let args = std::mem::take(&mut self.args);
        self.load_via_command_line(&args)?;
        debug!(entries = self.size(), sources = self.sources.len(), "load session complete");
        Ok(self.eval())
    }
}
