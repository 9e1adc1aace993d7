//! Test helpers shared across crates in the propstack workspace.
//!
//! The helpers wrap [`figment::Jail`] so each test runs inside a fresh
//! temporary working directory with its environment restored afterwards.

mod figment;

pub use figment::{figment_error, with_jail, write_file};
