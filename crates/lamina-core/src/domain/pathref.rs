//! Relocatable path references.
//!
//! A `!path`-tagged scalar is authored relative to the fragment that
//! defines it, but the compiled document may land in a different
//! directory. [`PathReference`] captures the defining directory at parse
//! time so the textual form can be re-expressed against any destination
//! at dump time.
//!
//! All path arithmetic here is **lexical**: referenced files may not
//! exist yet (a stage output, for instance), so we never touch the
//! filesystem or call `canonicalize`.

use std::path::{Component, Path, PathBuf};

/// Whether compiled documents carry relative or absolute path strings.
///
/// Resolved once per compile run from the project configuration
/// (`[tool.lamina] use_relative_paths`, default relative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMode {
    #[default]
    Relative,
    Absolute,
}

/// The rendering context for path references in one compiled document:
/// the directory the document is written to, plus the project-wide mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStyle {
    destination: PathBuf,
    mode: PathMode,
}

impl PathStyle {
    pub fn new(destination: impl Into<PathBuf>, mode: PathMode) -> Self {
        Self {
            destination: normalize_lexically(&destination.into()),
            mode,
        }
    }

    pub fn relative(destination: impl Into<PathBuf>) -> Self {
        Self::new(destination, PathMode::Relative)
    }

    pub fn absolute(destination: impl Into<PathBuf>) -> Self {
        Self::new(destination, PathMode::Absolute)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn mode(&self) -> PathMode {
        self.mode
    }
}

/// A path scalar bound to the directory of the fragment that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathReference {
    raw: String,
    source_dir: PathBuf,
}

impl PathReference {
    /// `raw` is the path string as authored; `source_dir` is the absolute
    /// directory of the defining fragment.
    pub fn new(raw: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw: raw.into(),
            source_dir: source_dir.into(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Same origin, different raw text. Used after template placeholders
    /// inside the raw path have been substituted.
    pub fn with_raw(&self, raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            source_dir: self.source_dir.clone(),
        }
    }

    /// The absolute location the reference points at, computed lexically.
    pub fn as_absolute(&self) -> PathBuf {
        normalize_lexically(&self.source_dir.join(&self.raw))
    }

    /// The reference re-expressed relative to `destination`, using OS-native
    /// separators. Falls back to the absolute form when no relative path can
    /// be constructed (different drives on Windows).
    pub fn as_relative_to(&self, destination: &Path) -> String {
        let target = self.as_absolute();
        let base = normalize_lexically(destination);
        match relative_from(&target, &base) {
            Some(rel) if rel.as_os_str().is_empty() => ".".to_owned(),
            Some(rel) => rel.to_string_lossy().into_owned(),
            None => target.to_string_lossy().into_owned(),
        }
    }

    /// The textual form a templating step (or the serializer) sees.
    pub fn render(&self, style: &PathStyle) -> String {
        match style.mode() {
            PathMode::Relative => self.as_relative_to(style.destination()),
            PathMode::Absolute => self.as_absolute().to_string_lossy().into_owned(),
        }
    }
}

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// `..` at the start of a relative path is preserved; `..` directly after
/// the root is dropped, matching how `/..` resolves on POSIX.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !starts_with_root(&out) {
                    out.push("..");
                }
            }
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
            }
            Component::Normal(c) => {
                out.push(c);
                depth += 1;
            }
        }
    }
    out
}

fn starts_with_root(path: &Path) -> bool {
    path.components()
        .next()
        .is_some_and(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}

/// Lexical equivalent of `os.path.relpath`: the path from `base` to
/// `target`, or `None` when they do not share a prefix (Windows drives).
///
/// Both arguments must be normalized absolute paths.
fn relative_from(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_iter = target.components();
    let mut base_iter = base.components();

    // Different prefixes (e.g. C: vs D:) have no relative form.
    let t_prefix = target.components().next();
    let b_prefix = base.components().next();
    if let (Some(Component::Prefix(t)), Some(Component::Prefix(b))) = (t_prefix, b_prefix) {
        if t != b {
            return None;
        }
    }

    let mut out = PathBuf::new();
    loop {
        match (target_iter.clone().next(), base_iter.clone().next()) {
            (Some(t), Some(b)) if t == b => {
                target_iter.next();
                base_iter.next();
            }
            (_, Some(_)) => {
                // Remaining base components become `..` hops.
                for comp in base_iter {
                    if !matches!(comp, Component::RootDir | Component::Prefix(_)) {
                        out.push("..");
                    }
                }
                for comp in target_iter {
                    out.push(comp.as_os_str());
                }
                return Some(out);
            }
            (Some(_), None) | (None, None) => {
                for comp in target_iter {
                    out.push(comp.as_os_str());
                }
                return Some(out);
            }
        }
    }
}
