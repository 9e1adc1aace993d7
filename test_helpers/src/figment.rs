//! Shared helpers for working with `figment::Jail` in tests.
//!
//! A jail switches the working directory to a scratch directory and restores
//! any environment variables set through it, which is exactly the isolation
//! local-file and fallback lookups need.

use anyhow::{Result, anyhow};
use std::path::Path;

/// Runs `f` with the working directory switched to a fresh scratch directory
/// and returns the closure's output.
///
/// Relative sources such as `resources/application.properties` therefore
/// resolve inside the jail, and environment variables set through
/// [`figment::Jail::set_env`] are restored afterwards. Failures are converted
/// into `anyhow::Error` so tests can use `?` directly.
///
/// # Errors
///
/// Returns an error if the jail initialisation fails or the closure returns a
/// [`figment::error::Error`].
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Writes `contents` to `relative` inside the jail, creating parent
/// directories such as `resources/` on demand.
///
/// # Errors
///
/// Returns a [`figment::Error`] when a directory or the file cannot be
/// created.
pub fn write_file(
    jail: &figment::Jail,
    relative: impl AsRef<Path>,
    contents: &str,
) -> figment::error::Result<()> {
    let target = jail.directory().join(relative.as_ref());
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(figment_error)?;
    }
    std::fs::write(&target, contents).map_err(figment_error)
}

/// Converts any error implementing [`ToString`] into a [`figment::Error`].
///
/// Helpful when bridging between `anyhow::Error` and APIs that expect a
/// figment-specific error type.
#[expect(
    clippy::needless_pass_by_value,
    reason = "callers often own the error and passing by value avoids extra clones"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
