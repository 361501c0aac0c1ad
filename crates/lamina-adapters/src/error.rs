//! Error types for the adapter layer.
//!
//! Classification drives the CLI exit code: user-input problems
//! (ambiguous roots, missing stage paths, stage selection) are
//! distinguishable from data-integrity failures (unparseable fragments,
//! broken template references) and plain I/O errors.

use std::path::PathBuf;

use thiserror::Error;

use lamina_core::prelude::DomainError;

/// Result type alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

#[derive(Debug, Error)]
pub enum AdapterError {
    // ── User input ─────────────────────────────────────────────────────────
    #[error("not inside a lamina project (no .git directory found above {start})")]
    NotInProject { start: PathBuf },

    #[error("specified paths point to an ambiguous project root")]
    AmbiguousProjectRoots,

    #[error("path to stage does not exist: {path}")]
    StagePathMissing { path: PathBuf },

    #[error("at least one stage must be defined in dvc.yaml (unless --all is specified)")]
    NoStages,

    #[error(
        "multiple stages are defined in dvc.yaml; disambiguate with `path/to/stage:stage_name`"
    )]
    MultipleStages,

    #[error("stage '{name}' not found in dvc.yaml")]
    StageNotFound { name: String },

    // ── Data integrity ─────────────────────────────────────────────────────
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid mapping key of type {kind} in {path}")]
    InvalidKey { path: PathBuf, kind: &'static str },

    #[error("fragment {path} must contain a mapping at the top level, found {kind}")]
    FragmentNotMapping { path: PathBuf, kind: &'static str },

    #[error("!path tag in {path} must wrap a string scalar, found {kind}")]
    PathTagNotScalar { path: PathBuf, kind: &'static str },

    #[error("destination {destination} is not the fragment directory {fragment_dir} or a child of it")]
    DestinationOutsideSource {
        fragment_dir: PathBuf,
        destination: PathBuf,
    },

    #[error("failed to read project settings from {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Merge-time failures from the core (undefined references, cycles,
    /// declared params missing from the resolved tree).
    #[error(transparent)]
    Domain(#[from] DomainError),

    // ── Not found ──────────────────────────────────────────────────────────
    #[error("no params.yaml (or compilable params.in.yaml) found in {dir}")]
    MissingCompiledConfig { dir: PathBuf },

    #[error("no dvc.yaml found in {dir}")]
    MissingStageFile { dir: PathBuf },

    // ── System ─────────────────────────────────────────────────────────────
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AdapterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` when the failure stems from what the user asked for rather
    /// than from broken data or the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotInProject { .. }
                | Self::AmbiguousProjectRoots
                | Self::StagePathMissing { .. }
                | Self::NoStages
                | Self::MultipleStages
                | Self::StageNotFound { .. }
        )
    }

    /// `true` when a requested artifact simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MissingCompiledConfig { .. } | Self::MissingStageFile { .. }
        )
    }
}
