//! Command-line override files.
//!
//! The override flag takes one value listing local files. Scanning is
//! fail-soft: a missing value, an unknown flag or a path that does not exist
//! adds nothing and raises no error.

use std::path::Path;

use tracing::debug;

use crate::PropsResult;
use crate::loader::Loader;
use crate::map::Origin;
use crate::paths::split_paths;

/// Returns the argument following the first token exactly equal to `flag`.
///
/// # Examples
///
/// ```
/// use propstack::override_target;
///
/// assert_eq!(override_target(["-p", "a.yaml"], "-p"), Some(String::from("a.yaml")));
/// assert_eq!(override_target(["-port", "8765"], "-p"), None);
/// assert_eq!(override_target(["-p"], "-p"), None);
/// ```
#[must_use]
pub fn override_target<I, S>(args: I, flag: &str) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = args.into_iter();
    iter.by_ref().find(|arg| AsRef::<str>::as_ref(arg) == flag)?;
    iter.next().map(|value| AsRef::<str>::as_ref(&value).to_owned())
}

impl Loader {
    /// Loads the override files named after the override flag in `args`.
    ///
    /// The value is split like a path list and each existing file is loaded
    /// in order with the adapter its suffix selects, so later files win.
    /// Returns the number of files loaded.
    ///
    /// # Errors
    ///
    /// Returns the first override file that exists but fails to read or
    /// parse.
    pub fn load_via_command_line<I, S>(&mut self, args: I) -> PropsResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let flag = self.options().override_flag.clone();
        let Some(target) = override_target(args, &flag) else {
            return Ok(0);
        };
        let mut loaded = 0;
        for token in split_paths(&target) {
            let path = Path::new(token);
            if !path.is_file() {
                debug!(path = token, "override file not found; skipping");
                continue;
            }
            if self.load_file_as(path, Origin::CommandLine)? {
                loaded += 1;
            }
        }
        Ok(loaded)
    }
}
