//! Platform-specific separator handling.
//!
//! The single boundary where OS-conditional behavior lives: everything
//! else in the merge/filter pipeline is platform-agnostic. When the
//! compiled document targets an OS with backslash separators, path-like
//! strings have forward slashes converted, except URLs (`://`) and
//! UNC/double-slash prefixes, which must stay untouched.

use std::borrow::Cow;

/// Which separator compiled path strings use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorStyle {
    Slash,
    Backslash,
}

impl SeparatorStyle {
    /// The style matching the OS the compiler runs on.
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Backslash
        } else {
            Self::Slash
        }
    }
}

/// Normalize one resolved string for the target serialization.
pub fn normalize_separators(s: &str, style: SeparatorStyle) -> Cow<'_, str> {
    match style {
        SeparatorStyle::Slash => Cow::Borrowed(s),
        SeparatorStyle::Backslash => {
            if s.contains("://") || s.starts_with("//") || s.starts_with(r"\\") {
                Cow::Borrowed(s)
            } else if s.contains('/') {
                Cow::Owned(s.replace('/', r"\"))
            } else {
                Cow::Borrowed(s)
            }
        }
    }
}
