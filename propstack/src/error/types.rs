//! Primary error enum for property loading flows.

use figment::Error as FigmentError;
use thiserror::Error;

/// Errors that can occur while loading or extracting properties.
///
/// Missing sources are never errors; only a source that exists but cannot
/// be read or parsed is reported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PropsError {
    /// Error originating from a properties or YAML file.
    #[error("Configuration file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: std::path::PathBuf,
        /// Underlying error reported by the adapter or the filesystem.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Malformed line-based `key=value` content.
    #[error("invalid properties syntax on line {line}: {message}")]
    Properties {
        /// One-based line number where the logical line starts.
        line: usize,
        /// Human-readable explanation of the syntax problem.
        message: String,
    },

    /// Malformed YAML content.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] Box<serde_saphyr::Error>),

    /// Failure writing resolved properties.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while extracting typed values from resolved properties.
    #[error("Failed to gather configuration: {0}")]
    Gathering(#[from] Box<FigmentError>),
}
