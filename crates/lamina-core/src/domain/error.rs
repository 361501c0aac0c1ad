use thiserror::Error;

/// Root domain error type.
///
/// All fatal conditions the pure layer can detect: broken template
/// references during interpolation and stage descriptors that declare
/// keys the resolved tree does not contain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Interpolation errors (data integrity: compilation must abort)
    // ========================================================================
    #[error("template references undefined key '{expr}'")]
    UndefinedReference { expr: String },

    #[error("circular template reference involving '{expr}'")]
    CircularReference { expr: String },

    #[error("template reference '{expr}' points to a {kind}, expected a scalar")]
    NonScalarReference { expr: String, kind: &'static str },

    // ========================================================================
    // Filter errors (propagated key-error semantics)
    // ========================================================================
    #[error("declared parameter '{key}' does not exist in the resolved configuration")]
    KeyNotFound { key: String },

    #[error("cannot descend into '{key}': value at '{parent}' is a {kind}, not a mapping")]
    NotAMapping {
        key: String,
        parent: String,
        kind: &'static str,
    },
}

impl DomainError {
    /// `true` for errors caused by a stage declaring keys that are absent
    /// from the resolved tree (as opposed to broken fragments).
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::KeyNotFound { .. } | Self::NotAMapping { .. }
        )
    }
}

/// Convenient result type alias.
pub type DomainResult<T> = Result<T, DomainError>;
