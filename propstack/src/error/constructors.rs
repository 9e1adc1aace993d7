//! Convenience constructors shared by the loaders.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use super::PropsError;

impl PropsError {
    /// Wraps a figment extraction failure.
    #[must_use]
    pub fn gathering(err: figment::Error) -> Self {
        Self::Gathering(Box::new(err))
    }

    /// Wraps a YAML adapter failure.
    #[must_use]
    pub fn yaml(err: serde_saphyr::Error) -> Self {
        Self::Yaml(Box::new(err))
    }

    /// Builds a properties syntax error for the logical line starting at `line`.
    #[must_use]
    pub fn properties(line: usize, message: impl Into<String>) -> Self {
        Self::Properties {
            line,
            message: message.into(),
        }
    }
}

impl From<figment::Error> for PropsError {
    fn from(e: figment::Error) -> Self {
        Self::gathering(e)
    }
}

impl From<serde_saphyr::Error> for PropsError {
    fn from(e: serde_saphyr::Error) -> Self {
        Self::yaml(e)
    }
}

/// Construct a [`PropsError::File`] for a source path.
pub(crate) fn file_error(
    path: &Path,
    err: impl Into<Box<dyn Error + Send + Sync>>,
) -> Arc<PropsError> {
    Arc::new(PropsError::File {
        path: path.to_path_buf(),
        source: err.into(),
    })
}

pub(crate) fn invalid_data(path: &Path, msg: impl Into<String>) -> Arc<PropsError> {
    file_error(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidData, msg.into()),
    )
}
