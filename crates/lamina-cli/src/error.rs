//! Error handling for the Lamina CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::error::Error;
use std::fmt::Write as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use lamina_adapters::AdapterError;
use lamina_core::prelude::DomainError;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// An error propagated from the compiler or the stage-config reader.
    ///
    /// Wrapped here so that the CLI can attach suggestions drawn from the
    /// adapter error's classification without touching its internals.
    #[error("{0}")]
    Adapter(#[from] AdapterError),

    /// An I/O operation failed outside the compiler itself.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Error categories for styling and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (ambiguous roots, bad stage locator).
    UserError,
    /// Resource not found (missing params.yaml or dvc.yaml).
    NotFound,
    /// Configuration error (unparseable fragments, broken references).
    Configuration,
    /// Internal/system error.
    Internal,
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Adapter(err) => adapter_suggestions(err),
            Self::Io { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Adapter(err) if err.is_user_error() => ErrorCategory::UserError,
            Self::Adapter(err) if err.is_not_found() => ErrorCategory::NotFound,
            Self::Adapter(AdapterError::Io { .. }) => ErrorCategory::Internal,
            Self::Adapter(_) => ErrorCategory::Configuration,
            Self::Io { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut out = String::new();

        let _ = write!(out, "\n{} {}\n\n", "✗".red().bold(), "Error:".red().bold());
        let _ = writeln!(out, "  {}", self.to_string().red());

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                let _ = writeln!(out, "\n  {} {}", "→".dimmed(), err.to_string().dimmed());
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(out, "\n{}", "Suggestions:".yellow().bold());
            for suggestion in suggestions {
                let _ = writeln!(out, "  {suggestion}");
            }
        }

        if !verbose {
            let _ = writeln!(
                out,
                "\n{} {}",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            );
        }

        out
    }

    /// Plain-text version of [`Self::format_colored`] — no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\nError: {self}");

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                let _ = writeln!(out, "  Caused by: {err}");
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                let _ = writeln!(out, "  {s}");
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

fn adapter_suggestions(err: &AdapterError) -> Vec<String> {
    match err {
        AdapterError::NotInProject { start } => vec![
            format!("No .git directory found above {}", start.display()),
            "Run lamina from inside a version-controlled project".into(),
            "Initialise one with: git init".into(),
        ],
        AdapterError::AmbiguousProjectRoots => vec![
            "The requested paths belong to different projects".into(),
            "Invoke lamina once per project instead".into(),
        ],
        AdapterError::StagePathMissing { path } => vec![
            format!("'{}' does not exist as a directory", path.display()),
            "Paths resolve against the working directory first, then the project root".into(),
        ],
        AdapterError::NoStages => vec![
            "The dvc.yaml in the stage directory defines no stages".into(),
            "Use --all to print the whole configuration without a stage".into(),
        ],
        AdapterError::MultipleStages => vec![
            "Several stages are defined in dvc.yaml".into(),
            "Disambiguate with: lamina get-config path/to/stage:stage_name".into(),
        ],
        AdapterError::StageNotFound { name } => vec![
            format!("No stage named '{name}' in dvc.yaml"),
            "Check the stage names under the stages: key".into(),
        ],
        AdapterError::MissingCompiledConfig { dir } => vec![
            format!("No params.yaml in {}", dir.display()),
            "Compile first: lamina compile".into(),
            "Or drop --skip-compile".into(),
        ],
        AdapterError::MissingStageFile { dir } => vec![
            format!("No dvc.yaml in {}", dir.display()),
            "Use --all to print the configuration without a stage descriptor".into(),
        ],
        AdapterError::Domain(DomainError::UndefinedReference { expr }) => vec![
            format!("The template references '{expr}', which is not defined anywhere in the merge chain"),
            "Check for typos in {{ }} expressions".into(),
        ],
        AdapterError::Domain(DomainError::KeyNotFound { key }) => vec![
            format!("The stage declares parameter '{key}', but it is absent from the resolved configuration"),
            "Add the key to a params.in.yaml, or remove it from the stage".into(),
        ],
        _ => Vec::new(),
    }
}
