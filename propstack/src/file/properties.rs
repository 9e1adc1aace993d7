//! Adapter for line-based `key=value` content.
//!
//! Follows the classic `.properties` syntax: `#` and `!` comment lines, `=`,
//! `:` or whitespace between key and value, backslash line continuation and
//! the `\t \n \r \f \uXXXX` escapes. A backslash before any other character
//! yields that character, which is how keys embed separators.

use std::path::Path;

use crate::error::file_error;
use crate::{PropsError, PropsResult};

use super::Pairs;

const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// Returns `true` when `line` ends in an odd run of backslashes.
fn continues(line: &str) -> bool {
    !line.chars().rev().take_while(|c| *c == '\\').count().is_multiple_of(2)
}

/// Splits a logical line at the first unescaped separator.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = idx;
            break;
        }
    }
    let (key, rest) = line.split_at(key_end);
    let after_blanks = rest.trim_start_matches(is_blank);
    let after_separator = after_blanks
        .strip_prefix(['=', ':'])
        .unwrap_or(after_blanks);
    (key, after_separator.trim_start_matches(is_blank))
}

fn read_hex_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u16, PropsError> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.chars().count() != 4 {
        return Err(PropsError::properties(line, "malformed \\uxxxx encoding"));
    }
    u16::from_str_radix(&digits, 16)
        .map_err(|_| PropsError::properties(line, format!("malformed \\u{digits} encoding")))
}

fn unescape(raw: &str, line: usize) -> Result<String, PropsError> {
    let mut out = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut out, line)?;
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => {
                units.push(read_hex_unit(&mut chars, line)?);
                continue;
            }
            Some(escaped) => {
                flush_units(&mut units, &mut out, line)?;
                out.push(match escaped {
                    't' => '\t',
                    'n' => '\n',
                    'r' => '\r',
                    'f' => '\u{c}',
                    other => other,
                });
            }
            None => {}
        }
    }
    flush_units(&mut units, &mut out, line)?;
    Ok(out)
}

/// Decodes buffered `\uXXXX` code units, pairing UTF-16 surrogates.
fn flush_units(units: &mut Vec<u16>, out: &mut String, line: usize) -> Result<(), PropsError> {
    for decoded in char::decode_utf16(units.drain(..)) {
        let c = decoded.map_err(|e| {
            PropsError::properties(
                line,
                format!("unpaired surrogate {:04x}", e.unpaired_surrogate()),
            )
        })?;
        out.push(c);
    }
    Ok(())
}

/// Parses `.properties` content into ordered pairs.
///
/// A key repeated within `data` appears once per occurrence; callers that
/// merge the pairs in order therefore keep the last value.
///
/// # Errors
///
/// Returns a [`PropsError::File`] for `path` wrapping a
/// [`PropsError::Properties`] when an escape sequence is malformed.
///
/// # Examples
///
/// ```
/// use propstack::parse_properties;
/// use std::path::Path;
///
/// let pairs = parse_properties(Path::new("app.properties"), "# comment\nname = Rob\nhello:there\n")?;
/// assert_eq!(pairs, [("name".into(), "Rob".into()), ("hello".into(), "there".into())]);
/// # Ok::<(), std::sync::Arc<propstack::PropsError>>(())
/// ```
pub fn parse_properties(path: &Path, data: &str) -> PropsResult<Pairs> {
    let mut pairs = Vec::new();
    let mut lines = data.lines().enumerate();
    while let Some((idx, physical)) = lines.next() {
        let line_no = idx + 1;
        let trimmed = physical.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
            continue;
        }
        let mut logical = String::from(trimmed);
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }
        let (key, value) = split_entry(&logical);
        let entry = unescape(key, line_no).and_then(|k| Ok((k, unescape(value, line_no)?)));
        pairs.push(entry.map_err(|e| file_error(path, e))?);
    }
    Ok(pairs)
}
