//! Cardinality-map set algebra over sort-tagged result entries.
//!
//! A result entry is a resource URI, optionally followed by
//! [`SORT_TOKEN`] and the entry's sort key. The algebra keys on the
//! stripped URI so that tagged and untagged entries for the same
//! resource combine, which lets a caller-supplied candidate set without
//! sort keys intersect against freshly tagged sub-results.

use std::collections::HashMap;

/// Private separator between a result URI and its sort key. Identity
/// URIs reject whitespace, so the token can never occur in one.
pub const SORT_TOKEN: &str = " #sort# ";

/// Append a sort key to a result entry.
pub fn tag(uri: &str, key: &str) -> String {
    format!("{uri}{SORT_TOKEN}{key}")
}

/// The URI part of an entry, with any sort key removed.
pub fn strip(entry: &str) -> &str {
    match entry.find(SORT_TOKEN) {
        Some(at) => &entry[..at],
        None => entry,
    }
}

/// The sort key of an entry, if it carries one.
pub fn sort_key(entry: &str) -> Option<&str> {
    entry
        .find(SORT_TOKEN)
        .map(|at| &entry[at + SORT_TOKEN.len()..])
}

/// Ordered union by multiplicity: every entry of `a` in order, then the
/// entries of `b` exceeding `a`'s cardinality for the same URI.
pub fn union(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for entry in &a {
        *seen.entry(strip(entry).to_string()).or_default() += 1;
    }
    let mut out = a;
    for entry in b {
        let remaining = seen.entry(strip(&entry).to_string()).or_default();
        if *remaining > 0 {
            *remaining -= 1;
        } else {
            out.push(entry);
        }
    }
    out
}

/// Ordered intersection by multiplicity: entries of `a`, in order, up to
/// `b`'s cardinality for the same URI.
pub fn intersection(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    let mut available: HashMap<String, usize> = HashMap::new();
    for entry in &b {
        *available.entry(strip(entry).to_string()).or_default() += 1;
    }
    a.into_iter()
        .filter(|entry| {
            let remaining = available.entry(strip(entry).to_string()).or_default();
            if *remaining > 0 {
                *remaining -= 1;
                true
            } else {
                false
            }
        })
        .collect()
}
