//! Conversions between `serde_yaml` documents and the core value model.
//!
//! Two directions, two flavors:
//!
//! - *plain* input (compiled `params.yaml`, `dvc.yaml`): no `!path` tags
//!   expected; any stray tag is stripped and its inner value kept.
//! - output: path references are rendered to their textual form against
//!   the document's [`PathStyle`], and every string passes through the
//!   separator-normalization boundary.
//!
//! Tag-aware *fragment* decoding lives in [`crate::loader`], which also
//! owns the missing-path warning bookkeeping.

use std::path::Path;

use lamina_core::prelude::{
    Mapping, PathStyle, SeparatorStyle, Value, normalize_separators,
};

use crate::error::{AdapterError, AdapterResult};

/// Decode a plain YAML document (no `!path` handling) into a core value.
pub fn value_from_plain_yaml(yaml: serde_yaml::Value, origin: &Path) -> AdapterResult<Value> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => number_to_value(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| value_from_plain_yaml(item, origin))
                .collect::<AdapterResult<_>>()?,
        ),
        serde_yaml::Value::Mapping(m) => {
            let mut out = Mapping::new();
            for (key, value) in m {
                out.insert(key_to_string(key, origin)?, value_from_plain_yaml(value, origin)?);
            }
            Value::Mapping(out)
        }
        serde_yaml::Value::Tagged(tagged) => value_from_plain_yaml(tagged.value, origin)?,
    })
}

/// Decode a whole plain document as a tree; an empty document is an empty
/// mapping.
pub fn tree_from_plain_yaml(yaml: serde_yaml::Value, origin: &Path) -> AdapterResult<Mapping> {
    match value_from_plain_yaml(yaml, origin)? {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        other => Err(AdapterError::FragmentNotMapping {
            path: origin.to_path_buf(),
            kind: other.kind(),
        }),
    }
}

/// Encode a resolved tree for the compiled output document.
pub fn tree_to_output_yaml(
    tree: &Mapping,
    style: &PathStyle,
    separators: SeparatorStyle,
) -> serde_yaml::Value {
    let mut out = serde_yaml::Mapping::new();
    for (key, value) in tree {
        out.insert(
            serde_yaml::Value::String(key.clone()),
            value_to_output_yaml(value, style, separators),
        );
    }
    serde_yaml::Value::Mapping(out)
}

fn value_to_output_yaml(
    value: &Value,
    style: &PathStyle,
    separators: SeparatorStyle,
) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(n) => serde_yaml::Value::Number((*n).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::String(s) => {
            serde_yaml::Value::String(normalize_separators(s, separators).into_owned())
        }
        Value::Path(p) => serde_yaml::Value::String(
            normalize_separators(&p.render(style), separators).into_owned(),
        ),
        Value::Sequence(items) => serde_yaml::Value::Sequence(
            items
                .iter()
                .map(|item| value_to_output_yaml(item, style, separators))
                .collect(),
        ),
        Value::Mapping(m) => tree_to_output_yaml(m, style, separators),
    }
}

/// Encode a tree for display on stdout (`get-config`). Trees read back
/// from `params.yaml` contain no live path references, so no style is
/// involved.
pub fn tree_to_display_yaml(tree: &Mapping) -> serde_yaml::Value {
    let mut out = serde_yaml::Mapping::new();
    for (key, value) in tree {
        out.insert(
            serde_yaml::Value::String(key.clone()),
            value_to_display_yaml(value),
        );
    }
    serde_yaml::Value::Mapping(out)
}

fn value_to_display_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(n) => serde_yaml::Value::Number((*n).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Path(p) => serde_yaml::Value::String(p.raw().to_owned()),
        Value::Sequence(items) => {
            serde_yaml::Value::Sequence(items.iter().map(value_to_display_yaml).collect())
        }
        Value::Mapping(m) => tree_to_display_yaml(m),
    }
}

pub(crate) fn number_to_value(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

pub(crate) fn key_to_string(key: serde_yaml::Value, origin: &Path) -> AdapterResult<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Err(AdapterError::InvalidKey {
            path: origin.to_path_buf(),
            kind: "null",
        }),
        serde_yaml::Value::Sequence(_) => Err(AdapterError::InvalidKey {
            path: origin.to_path_buf(),
            kind: "sequence",
        }),
        serde_yaml::Value::Mapping(_) => Err(AdapterError::InvalidKey {
            path: origin.to_path_buf(),
            kind: "mapping",
        }),
        serde_yaml::Value::Tagged(_) => Err(AdapterError::InvalidKey {
            path: origin.to_path_buf(),
            kind: "tagged value",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::prelude::PathReference;

    fn origin() -> &'static Path {
        Path::new("/proj/params.yaml")
    }

    #[test]
    fn plain_round_trip_preserves_order() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("z: 1\na: two\nm:\n  y: true\n  x: null\n").unwrap();
        let tree = tree_from_plain_yaml(yaml, origin()).unwrap();
        let keys: Vec<_> = tree.keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(tree["z"], Value::Int(1));
        assert_eq!(tree["a"], Value::from("two"));
        let m = tree["m"].as_mapping().unwrap();
        assert_eq!(m["y"], Value::Bool(true));
        assert_eq!(m["x"], Value::Null);
    }

    #[test]
    fn empty_document_is_empty_tree() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("").unwrap();
        let tree = tree_from_plain_yaml(yaml, origin()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn scalar_document_is_rejected() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("42").unwrap();
        let err = tree_from_plain_yaml(yaml, origin()).unwrap_err();
        assert!(matches!(err, AdapterError::FragmentNotMapping { .. }));
    }

    #[test]
    fn output_renders_path_references() {
        let mut tree = Mapping::new();
        tree.insert(
            "p".into(),
            Value::Path(PathReference::new("data/x.txt", "/proj")),
        );
        let style = PathStyle::relative("/proj/stage");
        let yaml = tree_to_output_yaml(&tree, &style, SeparatorStyle::Slash);
        let text = serde_yaml::to_string(&yaml).unwrap();
        assert_eq!(text, "p: ../data/x.txt\n");
    }

    #[test]
    fn output_applies_separator_style_to_strings() {
        let mut tree = Mapping::new();
        tree.insert("s".into(), Value::from("a/b/c"));
        tree.insert("u".into(), Value::from("https://x/y"));
        let style = PathStyle::relative("/proj");
        let yaml = tree_to_output_yaml(&tree, &style, SeparatorStyle::Backslash);
        let serde_yaml::Value::Mapping(m) = yaml else {
            panic!("expected mapping")
        };
        assert_eq!(m[&serde_yaml::Value::String("s".into())], serde_yaml::Value::String(r"a\b\c".into()));
        assert_eq!(m[&serde_yaml::Value::String("u".into())], serde_yaml::Value::String("https://x/y".into()));
    }

    #[test]
    fn numeric_keys_become_strings() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let tree = tree_from_plain_yaml(yaml, origin()).unwrap();
        assert!(tree.contains_key("1"));
        assert!(tree.contains_key("true"));
    }
}
