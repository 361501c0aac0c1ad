//! Parent-to-child layered merge.
//!
//! Layers arrive in root-to-leaf order; later layers take precedence.
//! Override semantics per key:
//!
//! - both sides mappings → merge recursively
//! - overlay is explicit `null` → tombstone, the merged value is `null`
//!   regardless of what the base held (entire sub-trees included)
//! - any other overlay value → wholesale replace (lists replace, they are
//!   never concatenated)
//!
//! Key order: keys keep the position where they first appeared across the
//! chain; keys introduced by a later layer are appended in that layer's
//! own order.

use indexmap::map::Entry;

use super::value::{Mapping, Value};

/// Merge an ordered sequence of layers (root first) into one tree.
pub fn merge_layers<I>(layers: I) -> Mapping
where
    I: IntoIterator<Item = Mapping>,
{
    let mut merged = Mapping::new();
    for layer in layers {
        merge_into(&mut merged, layer);
    }
    merged
}

fn merge_into(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match base.entry(key) {
            Entry::Occupied(mut slot) => match (slot.get_mut(), value) {
                (Value::Mapping(existing), Value::Mapping(incoming)) => {
                    merge_into(existing, incoming);
                }
                (existing, incoming) => *existing = incoming,
            },
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn leaf_scalar_wins() {
        let root = map(&[("value", Value::from("root"))]);
        let leaf = map(&[("value", Value::from("B"))]);
        let merged = merge_layers([root, leaf]);
        assert_eq!(merged["value"], Value::from("B"));
    }

    #[test]
    fn lists_replace_not_concatenate() {
        let root = map(&[(
            "list",
            Value::Sequence(vec![Value::from(1), Value::from(2), Value::from(3)]),
        )]);
        let leaf = map(&[(
            "list",
            Value::Sequence(vec![Value::from(3), Value::from(4)]),
        )]);
        let merged = merge_layers([root, leaf]);
        assert_eq!(
            merged["list"],
            Value::Sequence(vec![Value::from(3), Value::from(4)])
        );
    }

    #[test]
    fn mappings_merge_recursively() {
        let root = map(&[(
            "dict",
            Value::Mapping(map(&[("a", Value::from(1)), ("b", Value::from(2))])),
        )]);
        let leaf = map(&[(
            "dict",
            Value::Mapping(map(&[("b", Value::from(20)), ("c", Value::from(30))])),
        )]);
        let merged = merge_layers([root, leaf]);
        assert_eq!(
            merged["dict"],
            Value::Mapping(map(&[
                ("a", Value::from(1)),
                ("b", Value::from(20)),
                ("c", Value::from(30)),
            ]))
        );
    }

    #[test]
    fn null_tombstone_erases_everything() {
        let root = map(&[
            ("str", Value::from("str")),
            (
                "list",
                Value::Sequence(vec![Value::from(1), Value::from(2)]),
            ),
            (
                "dict",
                Value::Mapping(map(&[("a", Value::from(1)), ("b", Value::from(2))])),
            ),
        ]);
        let leaf = map(&[
            ("str", Value::Null),
            ("list", Value::Null),
            ("dict", Value::Null),
        ]);
        let merged = merge_layers([root, leaf]);
        assert_eq!(merged["str"], Value::Null);
        assert_eq!(merged["list"], Value::Null);
        assert_eq!(merged["dict"], Value::Null);
    }

    #[test]
    fn absent_key_inherits() {
        let root = map(&[("only_root", Value::from("foo")), ("value", Value::from("root"))]);
        let leaf = map(&[("value", Value::from("C"))]);
        let merged = merge_layers([root, leaf]);
        assert_eq!(merged["only_root"], Value::from("foo"));
        assert_eq!(merged["value"], Value::from("C"));
    }

    #[test]
    fn key_order_is_first_seen_root_to_leaf() {
        let root = map(&[("a", Value::from(1)), ("b", Value::from(2))]);
        let leaf = map(&[("c", Value::from(3)), ("b", Value::from(20)), ("d", Value::from(4))]);
        let merged = merge_layers([root, leaf]);
        let keys: Vec<_> = merged.keys().cloned().collect();
        assert_eq!(keys, ["a", "b", "c", "d"]);
    }

    #[test]
    fn three_layer_chain() {
        let root = map(&[("value", Value::from("root")), ("only_root", Value::from("foo"))]);
        let mid = map(&[("value", Value::from("B"))]);
        let leaf = map(&[("value", Value::from("C"))]);
        let merged = merge_layers([root, mid, leaf]);
        assert_eq!(merged["value"], Value::from("C"));
        assert_eq!(merged["only_root"], Value::from("foo"));
    }
}
