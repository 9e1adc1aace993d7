//! Tokenising of separator-delimited path lists.
//!
//! Active profile lists, the command-line override value and the
//! `load.properties` indirection key all share the same loose syntax: tokens
//! separated by any mix of ASCII whitespace, commas and semicolons.

/// Returns `true` for characters that separate path tokens.
const fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || matches!(c, ',' | ';')
}

/// Splits `raw` into its non-empty path tokens, preserving order.
///
/// Consecutive separators collapse and leading or trailing separators yield
/// no empty tokens, so an input without tokens produces an empty vector.
///
/// # Examples
///
/// ```
/// use propstack::split_paths;
///
/// assert_eq!(
///     split_paths("one two,three;four"),
///     ["one", "two", "three", "four"]
/// );
/// assert!(split_paths(" ,; ").is_empty());
/// ```
#[must_use]
pub fn split_paths(raw: &str) -> Vec<&str> {
    raw.split(is_separator)
        .filter(|token| !token.is_empty())
        .collect()
}
