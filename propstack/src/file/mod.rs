//! Reading properties and YAML sources into flat `(key, value)` pairs.

mod format;
mod properties;
mod reader;
mod yaml;

pub use format::Format;
pub use properties::parse_properties;
pub use yaml::parse_yaml;

pub(crate) use reader::read_pairs;

/// Ordered `(key, raw value)` pairs produced by an ingestion adapter.
pub type Pairs = Vec<(String, String)>;
