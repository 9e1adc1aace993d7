//! Reads one existing file through the adapter its format selects.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::PropsResult;
use crate::error::file_error;

use super::{Format, Pairs, parse_properties, parse_yaml};

/// Reads `path` and parses it as `format`.
///
/// Returns `Ok(None)` when the file does not exist or the format is
/// unrecognised; only a file that exists but cannot be read or parsed is an
/// error.
pub(crate) fn read_pairs(path: &Path, format: Format) -> PropsResult<Option<Pairs>> {
    if format == Format::Unrecognized {
        debug!(path = %path.display(), "ignoring file with unrecognised suffix");
        return Ok(None);
    }
    if !path.is_file() {
        return Ok(None);
    }
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(file_error(path, e)),
    };
    let pairs = match format {
        Format::Properties => parse_properties(path, &data)?,
        Format::Yaml => parse_yaml(path, &data)?,
        Format::Unrecognized => return Ok(None),
    };
    Ok(Some(pairs))
}
