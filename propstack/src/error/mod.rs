//! Error types produced while loading property sources.

mod constructors;
mod types;

pub use types::PropsError;

pub(crate) use constructors::{file_error, invalid_data};
