//! Project root detection and project-scope settings.
//!
//! The project root is the closest ancestor directory containing `.git`;
//! discovery and compilation never cross it. Upward searches repeat
//! heavily while climbing overlapping ancestor chains, so results are
//! memoized in an explicit per-run [`SearchCache`] rather than a process
//! global.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AdapterError, AdapterResult};

/// Per-invocation memo for upward filesystem searches.
///
/// Keyed on absolute paths so results stay correct regardless of the
/// working directory the search started from.
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: HashMap<(PathBuf, String, Option<PathBuf>), Option<PathBuf>>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Walk up from `start` until `name` is found or the filesystem root (or
/// `barrier`, when given) is reached. Returns the found entry's path.
pub fn find_in_parent(
    start: &Path,
    name: &str,
    barrier: Option<&Path>,
    cache: &mut SearchCache,
) -> AdapterResult<Option<PathBuf>> {
    let mut dir = absolute(start)?;
    if dir.is_file() {
        dir.pop();
    }
    let barrier = match barrier {
        Some(b) => Some(absolute(b)?),
        None => None,
    };

    let mut visited = Vec::new();
    let found = loop {
        let key = (dir.clone(), name.to_owned(), barrier.clone());
        if let Some(hit) = cache.entries.get(&key) {
            break hit.clone();
        }
        if let Some(b) = &barrier {
            if !dir.starts_with(b) {
                break None;
            }
        }
        visited.push(key);
        let candidate = dir.join(name);
        if candidate.exists() {
            break Some(candidate);
        }
        if !dir.pop() {
            break None;
        }
    };

    // Every level visited on the way resolves to the same answer.
    for key in visited {
        cache.entries.insert(key, found.clone());
    }
    Ok(found)
}

/// The lamina project root for `start`: the parent of the closest `.git`.
pub fn get_project_root(start: &Path, cache: &mut SearchCache) -> AdapterResult<PathBuf> {
    match find_in_parent(start, ".git", None, cache)? {
        // .parent, because the hit points at the .git directory itself
        Some(git_dir) => Ok(git_dir
            .parent()
            .expect(".git always has a parent")
            .to_path_buf()),
        None => Err(AdapterError::NotInProject {
            start: start.to_path_buf(),
        }),
    }
}

/// Resolve the single project root shared by all `paths`; ambiguity
/// (paths from different projects) is a user error.
pub fn check_project_roots(paths: &[PathBuf], cache: &mut SearchCache) -> AdapterResult<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for path in paths {
        let root = get_project_root(path, cache)?;
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    match roots.len() {
        1 => Ok(roots.remove(0)),
        _ => Err(AdapterError::AmbiguousProjectRoots),
    }
}

/// Settings recognized under `[tool.lamina]` in the project's
/// `pyproject.toml`. A missing file or section yields the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Compile `!path` references to relative paths (default) or absolute.
    pub use_relative_paths: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            use_relative_paths: true,
        }
    }
}

impl ProjectSettings {
    pub fn load(project_root: &Path) -> AdapterResult<Self> {
        let path = project_root.join("pyproject.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| AdapterError::io(&path, e))?;
        let doc: toml::Table = raw.parse().map_err(|source| AdapterError::Settings {
            path: path.clone(),
            source,
        })?;

        let mut settings = Self::default();
        if let Some(section) = doc.get("tool").and_then(|t| t.get("lamina")) {
            if let Some(flag) = section.get("use_relative_paths").and_then(|v| v.as_bool()) {
                settings.use_relative_paths = flag;
            }
        }
        debug!(?settings, "loaded project settings");
        Ok(settings)
    }
}

fn absolute(path: &Path) -> AdapterResult<PathBuf> {
    std::path::absolute(path).map_err(|e| AdapterError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_marker_in_ancestor() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let mut cache = SearchCache::new();
        let root = get_project_root(&nested, &mut cache).unwrap();
        assert_eq!(root, std::path::absolute(tmp.path()).unwrap());
    }

    #[test]
    fn missing_marker_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut cache = SearchCache::new();
        // The tempdir itself has no .git; walking up from it may still find
        // one in the environment, so search below an explicit barrier.
        let found = find_in_parent(tmp.path(), ".git", Some(tmp.path()), &mut cache).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn barrier_stops_the_walk() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("marker.txt"), "x").unwrap();
        let nested = tmp.path().join("sub");
        fs::create_dir_all(&nested).unwrap();

        let mut cache = SearchCache::new();
        let hit = find_in_parent(&nested, "marker.txt", Some(tmp.path()), &mut cache)
            .unwrap()
            .unwrap();
        assert_eq!(hit, std::path::absolute(tmp.path()).unwrap().join("marker.txt"));

        let blocked = find_in_parent(&nested, "marker.txt", Some(&nested), &mut cache).unwrap();
        assert!(blocked.is_none());
    }

    #[test]
    fn cache_returns_same_result() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("needle"), "x").unwrap();
        let nested = tmp.path().join("x/y");
        fs::create_dir_all(&nested).unwrap();

        let mut cache = SearchCache::new();
        let first = find_in_parent(&nested, "needle", Some(tmp.path()), &mut cache).unwrap();
        // Remove the file; the memoized answer must survive within the run.
        fs::remove_file(tmp.path().join("needle")).unwrap();
        let second = find_in_parent(&nested, "needle", Some(tmp.path()), &mut cache).unwrap();
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn ambiguous_roots_rejected() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        fs::create_dir_all(a.path().join(".git")).unwrap();
        fs::create_dir_all(b.path().join(".git")).unwrap();

        let mut cache = SearchCache::new();
        let err = check_project_roots(
            &[a.path().to_path_buf(), b.path().to_path_buf()],
            &mut cache,
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::AmbiguousProjectRoots));
    }

    #[test]
    fn settings_default_without_file() {
        let tmp = TempDir::new().unwrap();
        let settings = ProjectSettings::load(tmp.path()).unwrap();
        assert!(settings.use_relative_paths);
    }

    #[test]
    fn settings_read_from_tool_section() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("pyproject.toml"),
            "[tool.lamina]\nuse_relative_paths = false\n",
        )
        .unwrap();
        let settings = ProjectSettings::load(tmp.path()).unwrap();
        assert!(!settings.use_relative_paths);
    }

    #[test]
    fn settings_read_from_full_pyproject() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("pyproject.toml"),
            "[project]\nname = \"demo\"\nversion = \"0.1.0\"\n\n\
             [tool.lamina]\nuse_relative_paths = false\n\n\
             [tool.other]\nkey = 1\n",
        )
        .unwrap();
        let settings = ProjectSettings::load(tmp.path()).unwrap();
        assert!(!settings.use_relative_paths);
    }

    #[test]
    fn settings_ignore_unrelated_sections() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("pyproject.toml"),
            "[tool.other]\nuse_relative_paths = false\n",
        )
        .unwrap();
        let settings = ProjectSettings::load(tmp.path()).unwrap();
        assert!(settings.use_relative_paths);
    }
}
