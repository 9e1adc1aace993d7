//! Adapter for YAML documents backed by `serde-saphyr`.
//!
//! The document is read into a small node tree and flattened: every scalar
//! leaf becomes one entry keyed by the dot-joined mapping keys leading to it.

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::Number;
use serde_saphyr::Options;
use tracing::debug;

use crate::error::{file_error, invalid_data};
use crate::{PropsError, PropsResult};

use super::Pairs;

/// One YAML node as far as flattening cares.
///
/// Mapping values are read through `Option`, which is where `serde-saphyr`
/// recognises plain `~`, `null` and empty scalars.
#[derive(Debug, PartialEq)]
enum Node {
    Mapping(Vec<(String, Node)>),
    Sequence,
    Scalar(String),
    Null,
}

impl Node {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "a mapping",
            Self::Sequence => "a sequence",
            Self::Scalar(_) => "a scalar",
            Self::Null => "null",
        }
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML node")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        // Render like a JSON number so `1.0` keeps its fraction.
        Ok(Node::Scalar(
            Number::from_f64(v).map_or_else(|| v.to_string(), |n| n.to_string()),
        ))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Scalar(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Node::Sequence)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<Option<Node>>()?.unwrap_or(Node::Null);
            entries.push((key, value));
        }
        Ok(Node::Mapping(entries))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

fn flatten_into(prefix: &str, node: Node, out: &mut Pairs) {
    match node {
        Node::Mapping(entries) => {
            for (key, child) in entries {
                flatten_into(&join_key(prefix, &key), child, out);
            }
        }
        Node::Sequence => debug!(key = prefix, "skipping YAML sequence"),
        Node::Null => out.push((prefix.to_owned(), String::new())),
        Node::Scalar(s) => out.push((prefix.to_owned(), s)),
    }
}

/// Parse YAML contents using strict boolean semantics, so `yes` and `on`
/// remain strings.
fn parse_node(contents: &str) -> Result<Option<Node>, serde_saphyr::Error> {
    serde_saphyr::from_str_with_options(
        contents,
        Options {
            strict_booleans: true,
            ..Options::default()
        },
    )
}

/// Parses a YAML document and flattens it into dotted-key pairs.
///
/// Sequences are not flattened and contribute no entries; `null`, `~` and
/// empty leaves map to the empty string. An empty document yields no pairs.
///
/// # Errors
///
/// Returns a [`PropsError::File`] for `path` when the document is malformed
/// or its root is not a mapping.
///
/// # Examples
///
/// ```
/// use propstack::parse_yaml;
/// use std::path::Path;
///
/// let pairs = parse_yaml(Path::new("app.yaml"), "a:\n  b:\n    c: x\n")?;
/// assert_eq!(pairs, [("a.b.c".into(), "x".into())]);
/// # Ok::<(), std::sync::Arc<propstack::PropsError>>(())
/// ```
pub fn parse_yaml(path: &Path, data: &str) -> PropsResult<Pairs> {
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let node = parse_node(data).map_err(|e| file_error(path, PropsError::yaml(e)))?;
    let mut pairs = Vec::new();
    match node {
        Some(root @ Node::Mapping(_)) => flatten_into("", root, &mut pairs),
        None | Some(Node::Null) => {}
        Some(other) => {
            return Err(invalid_data(
                path,
                format!("expected a mapping at the document root, found {}", other.kind()),
            ));
        }
    }
    Ok(pairs)
}
