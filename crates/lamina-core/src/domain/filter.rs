//! Dependency-driven projection of a resolved tree.
//!
//! Given the dot-paths a stage declares, return the minimal sub-tree
//! containing exactly those keys. An ancestor path wins over its
//! descendants: requesting both `a` and `a.b` keeps the whole of `a`.
//! Output key order matches the *source* tree at every level, never the
//! request order.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::trace;

use super::error::{DomainError, DomainResult};
use super::value::{Mapping, Value};

/// Project `tree` down to the given dot-separated key paths.
///
/// Fails with [`DomainError::KeyNotFound`] when a declared path does not
/// exist, reporting the full dotted path of the missing key.
pub fn filter_tree(tree: &Mapping, keys: &BTreeSet<String>) -> DomainResult<Mapping> {
    trace!(requested = keys.len(), "filtering resolved tree");
    filter_level(tree, keys.iter().map(String::as_str).collect(), "")
}

fn filter_level(tree: &Mapping, keys: Vec<&str>, prefix: &str) -> DomainResult<Mapping> {
    // Group requested paths by their first component.
    let mut groups: IndexMap<&str, Vec<Option<&str>>> = IndexMap::new();
    for key in keys {
        let (head, rest) = match key.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (key, None),
        };
        groups.entry(head).or_default().push(rest);
    }

    let mut selected: IndexMap<&str, Value> = IndexMap::new();
    for (head, rests) in groups {
        let full = if prefix.is_empty() {
            head.to_owned()
        } else {
            format!("{prefix}.{head}")
        };
        let value = tree
            .get(head)
            .ok_or_else(|| DomainError::KeyNotFound { key: full.clone() })?;

        // A bare request for the key itself keeps the entire value;
        // descendant requests in the same group become irrelevant.
        let projected = if rests.iter().any(Option::is_none) {
            value.clone()
        } else {
            let sub = value
                .as_mapping()
                .ok_or_else(|| DomainError::NotAMapping {
                    key: format!("{full}.{}", rests[0].expect("non-bare rest")),
                    parent: full.clone(),
                    kind: value.kind(),
                })?;
            Value::Mapping(filter_level(
                sub,
                rests.into_iter().flatten().collect(),
                &full,
            )?)
        };
        selected.insert(head, projected);
    }

    // Emit in the order of the source tree, not the request.
    let mut out = Mapping::new();
    for key in tree.keys() {
        if let Some(value) = selected.swap_remove(key.as_str()) {
            out.insert(key.clone(), value);
        }
    }
    Ok(out)
}
