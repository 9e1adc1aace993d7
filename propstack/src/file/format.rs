//! Suffix-based selection of the ingestion adapter.

use std::path::Path;

/// Ingestion format chosen from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Line-based `key=value` content (`.properties`).
    Properties,
    /// Hierarchical YAML content (`.yaml` or `.yml`).
    Yaml,
    /// Any other suffix; such files are ignored.
    Unrecognized,
}

impl Format {
    /// Chooses the format for `path` by an exact, case-sensitive match on
    /// its suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use propstack::Format;
    /// use std::path::Path;
    ///
    /// assert_eq!(Format::from_path(Path::new("app.yml")), Format::Yaml);
    /// assert_eq!(Format::from_path(Path::new("app.toml")), Format::Unrecognized);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Self::Unrecognized;
        };
        if name.ends_with(".properties") {
            Self::Properties
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            Self::Yaml
        } else {
            Self::Unrecognized
        }
    }
}
