//! Infrastructure adapters for the Lamina configuration compiler.
//!
//! Everything that touches the filesystem or a serialization format lives
//! here: discovering fragments across a project tree, decoding YAML with
//! the `!path` tag, reading project settings from `pyproject.toml`,
//! writing compiled documents atomically, and retrieving per-stage
//! configuration. The pure merge/filter algorithms live in `lamina-core`.

pub mod codec;
pub mod compiler;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod project;
pub mod stage_config;
pub mod writer;

pub use compiler::{CompileSummary, compile_all_configs};
pub use error::{AdapterError, AdapterResult};
pub use stage_config::{GetConfigOptions, get_config};
