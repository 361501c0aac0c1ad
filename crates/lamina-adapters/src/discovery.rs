//! Fragment discovery across a project tree.
//!
//! Compilation must see every fragment a destination inherits from, so
//! discovery works in both directions from the requested paths: a
//! recursive descent picks up fragments below, and an ancestor climb
//! (bounded by the project root) picks up the ones above.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{AdapterError, AdapterResult};
use crate::project::{SearchCache, find_in_parent};

/// Input fragment filename.
pub const FRAGMENT_FILENAME: &str = "params.in.yaml";

/// All fragments relevant to `paths`: every fragment at or below each
/// path, plus every fragment on the ancestor chain up to `project_root`.
///
/// The result is a sorted set of absolute fragment paths.
pub fn discover_fragments(
    paths: &[PathBuf],
    project_root: &Path,
    cache: &mut SearchCache,
) -> AdapterResult<BTreeSet<PathBuf>> {
    let mut fragments = BTreeSet::new();

    for path in paths {
        let dir = std::path::absolute(path).map_err(|e| AdapterError::io(path, e))?;
        for entry in WalkDir::new(&dir) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&dir).to_path_buf();
                match e.into_io_error() {
                    Some(io) => AdapterError::io(path, io),
                    None => AdapterError::io(path, std::io::Error::other("filesystem loop")),
                }
            })?;
            if entry.file_type().is_file() && entry.file_name() == FRAGMENT_FILENAME {
                fragments.insert(entry.into_path());
            }
        }

        // Climb towards the project root; each hit restarts the search one
        // level above the directory that held it.
        let mut cursor = dir.parent().map(Path::to_path_buf);
        while let Some(from) = cursor {
            match find_in_parent(&from, FRAGMENT_FILENAME, Some(project_root), cache)? {
                Some(found) => {
                    let next = found.parent().and_then(Path::parent).map(Path::to_path_buf);
                    fragments.insert(found);
                    cursor = next;
                }
                None => cursor = None,
            }
        }
    }

    debug!(count = fragments.len(), "discovered config fragments");
    Ok(fragments)
}

/// The merge chain for `fragment`: every discovered fragment whose
/// directory is an ancestor of (or equal to) the fragment's own, ordered
/// outermost first.
pub fn ancestor_chain(fragment: &Path, all: &BTreeSet<PathBuf>) -> Vec<PathBuf> {
    let mut chain: Vec<PathBuf> = all
        .iter()
        .filter(|candidate| {
            candidate
                .parent()
                .is_some_and(|dir| fragment.starts_with(dir))
        })
        .cloned()
        .collect();
    chain.sort_by_key(|p| p.components().count());
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(FRAGMENT_FILENAME);
        fs::write(&path, "a: 1\n").unwrap();
        path
    }

    #[test]
    fn descent_finds_nested_fragments() {
        let tmp = TempDir::new().unwrap();
        let root = std::path::absolute(tmp.path()).unwrap();
        let a = touch(&root);
        let b = touch(&root.join("x/y"));

        let mut cache = SearchCache::new();
        let found = discover_fragments(&[root.clone()], &root, &mut cache).unwrap();
        assert_eq!(found, BTreeSet::from([a, b]));
    }

    #[test]
    fn climb_finds_ancestors_up_to_root() {
        let tmp = TempDir::new().unwrap();
        let root = std::path::absolute(tmp.path()).unwrap();
        let top = touch(&root);
        let mid = touch(&root.join("a"));
        let leaf_dir = root.join("a/b/c");
        let leaf = touch(&leaf_dir);

        let mut cache = SearchCache::new();
        let found = discover_fragments(&[leaf_dir], &root, &mut cache).unwrap();
        assert_eq!(found, BTreeSet::from([top, mid, leaf]));
    }

    #[test]
    fn fragmentless_request_still_surfaces_ancestor() {
        // The requested directory has no fragment of its own; the nearest
        // one sits two levels up and must be included unconditionally.
        let tmp = TempDir::new().unwrap();
        let root = std::path::absolute(tmp.path()).unwrap();
        let ancestor = touch(&root.join("a"));
        let bare = root.join("a/b/c");
        fs::create_dir_all(&bare).unwrap();

        let mut cache = SearchCache::new();
        let found = discover_fragments(&[bare], &root, &mut cache).unwrap();
        assert_eq!(found, BTreeSet::from([ancestor]));
    }

    #[test]
    fn climb_stops_at_project_root() {
        let tmp = TempDir::new().unwrap();
        let base = std::path::absolute(tmp.path()).unwrap();
        touch(&base); // outside the project, must not appear
        let root = base.join("proj");
        let inner_dir = root.join("stage");
        let inner = touch(&inner_dir);

        let mut cache = SearchCache::new();
        let found = discover_fragments(&[inner_dir], &root, &mut cache).unwrap();
        assert_eq!(found, BTreeSet::from([inner]));
    }

    #[test]
    fn chain_orders_outermost_first() {
        let tmp = TempDir::new().unwrap();
        let root = std::path::absolute(tmp.path()).unwrap();
        let top = touch(&root);
        let mid = touch(&root.join("a"));
        let leaf = touch(&root.join("a/b"));
        let sibling = touch(&root.join("other"));

        let all = BTreeSet::from([top.clone(), mid.clone(), leaf.clone(), sibling]);
        let chain = ancestor_chain(&leaf, &all);
        assert_eq!(chain, vec![top, mid, leaf]);
    }

    #[test]
    fn chain_excludes_siblings_and_descendants() {
        let tmp = TempDir::new().unwrap();
        let root = std::path::absolute(tmp.path()).unwrap();
        let top = touch(&root);
        let mid = touch(&root.join("a"));
        touch(&root.join("a/deeper"));
        touch(&root.join("b"));

        let all: BTreeSet<PathBuf> = discover_fragments(
            &[root.clone()],
            &root,
            &mut SearchCache::new(),
        )
        .unwrap();
        let chain = ancestor_chain(&mid, &all);
        assert_eq!(chain, vec![top, mid]);
    }
}
