//! Stage descriptors (external `dvc.yaml` stages, consumed not owned).
//!
//! The core only cares about which configuration keys a stage declares:
//! explicit `params` entries plus every `${ dotted.path }` placeholder
//! embedded in `deps` or `outs` strings. `cmd` and all orchestration
//! semantics belong to the external DAG runner.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static DVC_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*(.*?)\s*\}").expect("dvc placeholder regex"));

/// The subset of a stage definition the compiler reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageDescriptor {
    /// Explicit dot-path entries from the `params` list.
    pub params: Vec<String>,
    /// Dependency strings; may embed `${ ... }` placeholders.
    pub deps: Vec<String>,
    /// Output strings; may embed `${ ... }` placeholders.
    pub outs: Vec<String>,
    /// Whether the stage defines a `matrix`. Matrix iteration variables
    /// are rooted at `item` and are not configuration content.
    pub matrix: bool,
}

impl StageDescriptor {
    /// All dot-paths this stage declares as inputs, ready to hand to
    /// [`filter_tree`](super::filter::filter_tree).
    ///
    /// For matrix stages, paths rooted at `item` are synthetic
    /// per-iteration variables and are excluded.
    pub fn declared_params(&self) -> BTreeSet<String> {
        let mut keys: BTreeSet<String> = self.params.iter().cloned().collect();
        for text in self.deps.iter().chain(self.outs.iter()) {
            for caps in DVC_PLACEHOLDER.captures_iter(text) {
                keys.insert(caps[1].to_owned());
            }
        }
        if self.matrix {
            keys.retain(|k| k != "item" && !k.starts_with("item."));
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn explicit_params_are_verbatim() {
        let stage = StageDescriptor {
            params: vec!["param".into(), "parent.foo".into()],
            ..Default::default()
        };
        assert_eq!(stage.declared_params(), set(&["param", "parent.foo"]));
    }

    #[test]
    fn placeholders_in_deps_and_outs_are_extracted() {
        let stage = StageDescriptor {
            deps: vec!["${ parent.foo }".into()],
            outs: vec!["${ parent.bar }".into()],
            ..Default::default()
        };
        assert_eq!(
            stage.declared_params(),
            set(&["parent.foo", "parent.bar"])
        );
    }

    #[test]
    fn multiple_placeholders_in_one_string() {
        let stage = StageDescriptor {
            deps: vec!["/some/path/${ parent.foo }/xxx/${other}".into()],
            ..Default::default()
        };
        assert_eq!(stage.declared_params(), set(&["parent.foo", "other"]));
    }

    #[test]
    fn plain_dep_strings_contribute_nothing() {
        let stage = StageDescriptor {
            deps: vec!["parent.bar".into()],
            ..Default::default()
        };
        assert!(stage.declared_params().is_empty());
    }

    #[test]
    fn whitespace_around_path_is_trimmed() {
        let stage = StageDescriptor {
            outs: vec!["${   spaced.key   }".into()],
            ..Default::default()
        };
        assert_eq!(stage.declared_params(), set(&["spaced.key"]));
    }

    #[test]
    fn matrix_excludes_item_rooted_paths() {
        let stage = StageDescriptor {
            params: vec!["item.mp".into(), "item".into(), "real.key".into()],
            deps: vec!["${ item.other }".into()],
            matrix: true,
            ..Default::default()
        };
        assert_eq!(stage.declared_params(), set(&["real.key"]));
    }

    #[test]
    fn non_matrix_keeps_item_paths() {
        let stage = StageDescriptor {
            params: vec!["item.mp".into()],
            ..Default::default()
        };
        assert_eq!(stage.declared_params(), set(&["item.mp"]));
    }
}
