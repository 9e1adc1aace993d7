//! Resolution of `${key}` and `${key:default}` placeholders.
//!
//! A placeholder is looked up in the loaded map first, then in the external
//! fallback source, then replaced by its inline default; when none applies it
//! becomes the empty string. Map values are themselves resolved, so
//! references chain transitively. Keys, defaults and referenced values may
//! all contain further placeholders (`${${env}.url:${fallback.url}}`).
//!
//! Each lookup carries the chain of map keys currently being resolved. A key
//! that reappears in its own chain is not read from the map again; the
//! lookup continues with the fallback source and the default instead. This
//! keeps resolution terminating and lets `port=${port:8080}` pick up an
//! environment override.
//!
//! Values that never met a cut are shared across the whole evaluation.
//! Values that did are kept only until the current top-level resolution
//! finishes: within it every key is expanded at most once, and the first
//! expansion, taken depth-first from left to right, wins.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::fallback::PropertySource;
use crate::map::ConfigMap;

const OPEN: &str = "${";

/// Outcome of resolving a fragment.
struct Resolved {
    value: String,
    /// Set when a cycle was cut while producing `value`, making the result
    /// depend on the lookup chain and therefore unsuitable for caching.
    cut: bool,
}

/// Returns the byte offset of the `}` closing a placeholder whose body
/// starts at the beginning of `s`.
fn find_close(s: &str) -> Option<usize> {
    let mut depth = 0_usize;
    let mut chars = s.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '$' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                depth += 1;
            }
            '}' if depth == 0 => return Some(idx),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Splits a placeholder body at its first top-level `:`.
fn split_default(body: &str) -> (&str, Option<&str>) {
    let mut depth = 0_usize;
    let mut chars = body.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '$' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                depth += 1;
            }
            '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                let (key, rest) = body.split_at(idx);
                return (key, rest.get(1..));
            }
            _ => {}
        }
    }
    (body, None)
}

/// Resolves placeholders against a [`ConfigMap`] and a fallback source.
///
/// Fully resolved map values are cached, so evaluating every entry of a map
/// resolves each referenced key at most once. Keys caught in a cycle are
/// expanded at most once per entry.
///
/// # Examples
///
/// ```
/// use propstack::{ConfigMap, Evaluator, NoFallback};
///
/// let map: ConfigMap = [("name", "Rob"), ("hello", "there")].into_iter().collect();
/// let mut eval = Evaluator::new(&map, &NoFallback);
/// assert_eq!(eval.resolve("https://${hello}/name/${name}"), "https://there/name/Rob");
/// assert_eq!(eval.resolve("${x:bart}"), "bart");
/// assert_eq!(eval.resolve("${x}"), "");
/// ```
pub struct Evaluator<'a> {
    map: &'a ConfigMap,
    fallback: &'a dyn PropertySource,
    cache: HashMap<String, String>,
    /// Cut-dependent values for the current top-level resolution.
    scratch: HashMap<String, String>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator over `map`, consulting `fallback` for keys the
    /// map does not define.
    #[must_use]
    pub fn new(map: &'a ConfigMap, fallback: &'a dyn PropertySource) -> Self {
        Self {
            map,
            fallback,
            cache: HashMap::new(),
            scratch: HashMap::new(),
        }
    }

    /// Resolves every placeholder in `raw`.
    pub fn resolve(&mut self, raw: &str) -> String {
        self.scratch.clear();
        let mut chain = Vec::new();
        self.expand(raw, &mut chain).value
    }

    /// Resolves the value a key would have, looking it up the same way a
    /// `${key}` placeholder would. Returns `None` when neither the map nor
    /// the fallback source defines `key`.
    pub fn lookup(&mut self, key: &str) -> Option<String> {
        self.scratch.clear();
        let mut chain = Vec::new();
        self.find(key.trim(), &mut chain).0
    }

    /// Resolves every entry of the map, preserving its order.
    #[must_use]
    pub fn resolve_all(mut self) -> IndexMap<String, String> {
        let map = self.map;
        map.iter()
            .map(|(key, raw)| {
                let value = match self.cache.get(key) {
                    Some(done) => done.clone(),
                    None => {
                        self.scratch.clear();
                        let mut chain = vec![key.to_owned()];
                        let resolved = self.expand(raw, &mut chain);
                        if !resolved.cut {
                            self.cache.insert(key.to_owned(), resolved.value.clone());
                        }
                        resolved.value
                    }
                };
                (key.to_owned(), value)
            })
            .collect()
    }

    /// Replaces each placeholder in `raw`, leaving surrounding text intact.
    /// An opening `${` without a matching `}` is kept literally.
    fn expand(&mut self, raw: &str, chain: &mut Vec<String>) -> Resolved {
        let mut out = String::with_capacity(raw.len());
        let mut cut = false;
        let mut rest = raw;
        while let Some(start) = rest.find(OPEN) {
            let (literal, from_open) = rest.split_at(start);
            out.push_str(literal);
            let body_and_tail = from_open.get(OPEN.len()..).unwrap_or_default();
            let Some(end) = find_close(body_and_tail) else {
                out.push_str(from_open);
                rest = "";
                break;
            };
            let (body, tail) = body_and_tail.split_at(end);
            let resolved = self.expression(body, chain);
            out.push_str(&resolved.value);
            cut |= resolved.cut;
            rest = tail.get(1..).unwrap_or_default();
        }
        out.push_str(rest);
        Resolved { value: out, cut }
    }

    fn expression(&mut self, body: &str, chain: &mut Vec<String>) -> Resolved {
        let (raw_key, default) = split_default(body);
        let key = self.expand(raw_key, chain);
        let (found, found_cut) = self.find(key.value.trim(), chain);
        let mut cut = key.cut || found_cut;
        if let Some(value) = found {
            return Resolved { value, cut };
        }
        let value = match default {
            Some(literal) => {
                let resolved = self.expand(literal, chain);
                cut |= resolved.cut;
                resolved.value
            }
            None => {
                trace!(key = %key.value, "placeholder has no value");
                String::new()
            }
        };
        Resolved { value, cut }
    }

    /// Looks `key` up in the map, then the fallback source. The flag reports
    /// whether a cycle was cut on the way.
    fn find(&mut self, key: &str, chain: &mut Vec<String>) -> (Option<String>, bool) {
        if key.is_empty() {
            return (None, false);
        }
        let map = self.map;
        let cycle = chain.iter().any(|seen| seen == key);
        if cycle {
            debug!(key, chain = ?chain, "placeholder cycle cut");
        } else if let Some(done) = self.cache.get(key) {
            return (Some(done.clone()), false);
        } else if let Some(done) = self.scratch.get(key) {
            return (Some(done.clone()), true);
        } else if let Some(raw) = map.get(key) {
            trace!(key, "resolving placeholder from loaded map");
            chain.push(key.to_owned());
            let resolved = self.expand(raw, chain);
            chain.pop();
            let store = if resolved.cut {
                &mut self.scratch
            } else {
                &mut self.cache
            };
            store.insert(key.to_owned(), resolved.value.clone());
            return (Some(resolved.value), resolved.cut);
        }
        let value = self.fallback.property(key);
        if value.is_some() {
            trace!(key, "resolving placeholder from fallback source");
        }
        (value, cycle)
    }
}

/// Resolves every value of `map` against itself and `fallback`.
#[must_use]
pub fn resolve_map(map: &ConfigMap, fallback: &dyn PropertySource) -> IndexMap<String, String> {
    Evaluator::new(map, fallback).resolve_all()
}

#[cfg(test)]
mod tests {
    use super::{Evaluator, find_close, resolve_map, split_default};
    use crate::fallback::NoFallback;
    use crate::map::ConfigMap;
    use indexmap::IndexMap;
    use rstest::{fixture, rstest};
    use std::time::{Duration, Instant};

    #[fixture]
    fn base() -> ConfigMap {
        [
            ("name", "Rob"),
            ("hello", "there"),
            ("app.two", "Two"),
            ("nested.key", "${app.two}"),
            ("env", "prod"),
            ("prod.url", "https://prod"),
        ]
        .into_iter()
        .collect()
    }

    fn fallback() -> IndexMap<String, String> {
        [
            ("eureka.instance.hostname", "host1"),
            ("server.port", "9876"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
    }

    #[rstest]
    #[case("https://${hello}/name/${name}", "https://there/name/Rob")]
    #[case("before|${app.two}|after", "before|Two|after")]
    #[case("before|${nested.key}|after", "before|Two|after")]
    #[case("${x:bart}", "bart")]
    #[case("${x}", "")]
    #[case("${x:}", "")]
    #[case("${x:http://localhost:80}", "http://localhost:80")]
    #[case("${missing:${name}}", "Rob")]
    #[case("${${env}.url}", "https://prod")]
    #[case("${ name }", "Rob")]
    #[case("plain text", "plain text")]
    #[case("cost: $5 {each}", "cost: $5 {each}")]
    #[case("open ${name", "open ${name")]
    #[case("${}", "")]
    fn resolves_against_map(base: ConfigMap, #[case] raw: &str, #[case] expected: &str) {
        let mut eval = Evaluator::new(&base, &NoFallback);
        assert_eq!(eval.resolve(raw), expected);
    }

    #[rstest]
    #[case("https://${eureka.instance.hostname}:${server.port}/status", "https://host1:9876/status")]
    #[case("https://${eureka.instance.hostnameX:aaa}:${server.port}/status2", "https://aaa:9876/status2")]
    #[case("https://${eureka.instance.hostnameX:aaa}:${server.portX:89}/status3", "https://aaa:89/status3")]
    #[case("${name:fallback}", "Rob")]
    fn map_then_fallback_then_default(base: ConfigMap, #[case] raw: &str, #[case] expected: &str) {
        let fb = fallback();
        let mut eval = Evaluator::new(&base, &fb);
        assert_eq!(eval.resolve(raw), expected);
    }

    #[rstest]
    fn map_shadows_fallback() {
        let map: ConfigMap = [("server.port", "1111")].into_iter().collect();
        let fb = fallback();
        let mut eval = Evaluator::new(&map, &fb);
        assert_eq!(eval.resolve("${server.port}"), "1111");
    }

    #[rstest]
    fn self_reference_uses_fallback_then_default() {
        let map: ConfigMap = [("server.port", "${server.port:8080}"), ("other", "${other:7}")]
            .into_iter()
            .collect();
        let fb = fallback();
        let resolved = resolve_map(&map, &fb);
        assert_eq!(resolved.get("server.port").map(String::as_str), Some("9876"));
        assert_eq!(resolved.get("other").map(String::as_str), Some("7"));
    }

    #[rstest]
    fn transitive_cycles_terminate() {
        let map: ConfigMap = [
            ("a", "x${b}"),
            ("b", "y${c}"),
            ("c", "z${a}"),
            ("d", "[${a}]"),
        ]
        .into_iter()
        .collect();
        let resolved = resolve_map(&map, &NoFallback);
        assert_eq!(resolved.get("a").map(String::as_str), Some("xyz"));
        assert_eq!(resolved.get("b").map(String::as_str), Some("yzx"));
        assert_eq!(resolved.get("c").map(String::as_str), Some("zxy"));
        assert_eq!(resolved.get("d").map(String::as_str), Some("[xyz]"));
    }

    #[rstest]
    fn branching_cycles_resolve_quickly() {
        let n = 40;
        let map: ConfigMap = (0..n)
            .map(|i| {
                let next = if i + 1 == n { 0 } else { i + 1 };
                (format!("k{i}"), format!("${{k{next}}}${{k{next}}}"))
            })
            .collect();
        let started = Instant::now();
        let resolved = resolve_map(&map, &NoFallback);
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
        assert_eq!(resolved.len(), n);
        assert!(resolved.values().all(String::is_empty), "got {resolved:?}");
    }

    #[rstest]
    fn cycle_results_do_not_depend_on_entry_order() {
        let entries = [("a", "${b}|${c}"), ("b", "${c}-${a:x}"), ("c", "${b:y}")];
        let forward: ConfigMap = entries.into_iter().collect();
        let backward: ConfigMap = entries.into_iter().rev().collect();
        let one = resolve_map(&forward, &NoFallback);
        let two = resolve_map(&backward, &NoFallback);
        for key in ["a", "b", "c"] {
            assert_eq!(one.get(key), two.get(key), "mismatch for {key}");
        }
    }

    #[rstest]
    fn resolution_is_order_independent() {
        let forward: ConfigMap = [("a", "${b}-a"), ("b", "${c}-b"), ("c", "c")]
            .into_iter()
            .collect();
        let backward: ConfigMap = [("c", "c"), ("b", "${c}-b"), ("a", "${b}-a")]
            .into_iter()
            .collect();
        let one = resolve_map(&forward, &NoFallback);
        let two = resolve_map(&backward, &NoFallback);
        for key in ["a", "b", "c"] {
            assert_eq!(one.get(key), two.get(key), "mismatch for {key}");
        }
        assert_eq!(one.get("a").map(String::as_str), Some("c-b-a"));
    }

    #[rstest]
    fn stored_raw_values_are_untouched(base: ConfigMap) {
        let before = base.clone();
        let _resolved = resolve_map(&base, &NoFallback);
        assert_eq!(base, before);
    }

    #[rstest]
    fn lookup_distinguishes_absent_keys(base: ConfigMap) {
        let mut eval = Evaluator::new(&base, &NoFallback);
        assert_eq!(eval.lookup("nested.key").as_deref(), Some("Two"));
        assert_eq!(eval.lookup("absent"), None);
    }

    #[rstest]
    #[case("key}", Some(3))]
    #[case("a${b}c}", Some(6))]
    #[case("a${b}", None)]
    fn finds_matching_close(#[case] s: &str, #[case] expected: Option<usize>) {
        assert_eq!(find_close(s), expected);
    }

    #[rstest]
    #[case("key", "key", None)]
    #[case("key:def", "key", Some("def"))]
    #[case("key:a:b", "key", Some("a:b"))]
    #[case("${a:b}:c", "${a:b}", Some("c"))]
    fn splits_on_top_level_colon(
        #[case] body: &str,
        #[case] key: &str,
        #[case] default: Option<&str>,
    ) {
        assert_eq!(split_default(body), (key, default));
    }
}
