//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and environment bindings.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "lamina",
    bin_name = "lamina",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Hierarchical configuration compiler",
    long_about = "Lamina merges per-directory params.in.yaml fragments into \
                  fully-resolved params.yaml files, respecting parent/child \
                  override semantics, relocatable !path references, and \
                  {{ }} template interpolation.",
    after_help = "EXAMPLES:\n\
        \x20 lamina compile\n\
        \x20 lamina compile stages/train stages/evaluate\n\
        \x20 lamina get-config stages/train\n\
        \x20 lamina get-config stages/train:fit --skip-compile",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile params.in.yaml fragments into resolved params.yaml files.
    #[command(
        visible_alias = "c",
        about = "Compile configuration fragments",
        after_help = "EXAMPLES:\n\
            \x20 lamina compile                 # current directory\n\
            \x20 lamina compile stages/train    # one subtree\n\
            \x20 lamina compile a b c           # several subtrees at once"
    )]
    Compile(CompileArgs),

    /// Print the resolved configuration for one stage.
    #[command(
        name = "get-config",
        about = "Print a stage's resolved configuration",
        after_help = "EXAMPLES:\n\
            \x20 lamina get-config stages/train\n\
            \x20 lamina get-config stages/train:fit\n\
            \x20 lamina get-config stages/train --all\n\
            \x20 lamina get-config stages/train --skip-compile"
    )]
    GetConfig(GetConfigArgs),
}

// ── compile ───────────────────────────────────────────────────────────────────

/// Arguments for `lamina compile`.
#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Paths to compile.  Files resolve to their containing directory;
    /// with no arguments the current directory is used.
    #[arg(value_name = "PATH", help = "Paths to compile (default: current directory)")]
    pub paths: Vec<PathBuf>,
}

// ── get-config ────────────────────────────────────────────────────────────────

/// Arguments for `lamina get-config`.
#[derive(Debug, Args)]
pub struct GetConfigArgs {
    /// Stage locator: a path, optionally followed by `:stage_name` when
    /// the stage file defines several stages.
    #[arg(value_name = "STAGE", help = "Stage locator: path[:stage_name]")]
    pub stage: String,

    /// Print the whole resolved configuration instead of the subset the
    /// stage declares.
    #[arg(long = "all", help = "Bypass filtering and print everything")]
    pub all: bool,

    /// Read the existing params.yaml without recompiling first.
    #[arg(
        long = "skip-compile",
        env = "LAMINA_SKIP_COMPILE",
        help = "Do not recompile before reading"
    )]
    pub skip_compile: bool,
}

// ── tests ─────────────────────────────────────────────────────────────────────
