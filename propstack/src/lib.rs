//! Layered properties loading with placeholder resolution.
//!
//! `propstack` stacks configuration sources into one flat string map:
//! bundled resources, profile overlays, local files, files named on the
//! command line and an external fallback such as the process environment.
//! Later sources override earlier ones. Nested YAML documents are flattened
//! into dotted keys, and `${key}` / `${key:default}` placeholders are resolved
//! against the merged map and the fallback.
//!
//! ```rust,no_run
//! use propstack::Loader;
//!
//! # fn main() -> propstack::PropsResult<()> {
//! let props = Loader::builder().args(std::env::args()).build().load()?;
//! if let Some(port) = props.get("server.port") {
//!     println!("listening on {port}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Missing sources are skipped silently. Only a source that exists but
//! cannot be read or parsed produces an error.

mod cli;
mod error;
mod fallback;
mod file;
mod loader;
mod map;
mod paths;
mod placeholder;
mod profile;
mod properties;

pub use cli::override_target;
pub use error::PropsError;
pub use fallback::{NoFallback, PropertySource, SystemProperties};
pub use file::{Format, Pairs, parse_properties, parse_yaml};
pub use loader::{Loader, LoaderBuilder, LoaderOptions};
pub use map::{ConfigMap, Origin, SourceEntry};
pub use paths::split_paths;
pub use placeholder::{Evaluator, resolve_map};
pub use properties::Properties;

/// Result type for fallible loading operations.
///
/// Errors are shared so a single failure can be reported by several layers
/// without cloning.
pub type PropsResult<T> = Result<T, std::sync::Arc<PropsError>>;
