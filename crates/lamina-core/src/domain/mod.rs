//! Core domain layer for Lamina.
//!
//! This module contains pure merge/filter/interpolation logic with no I/O.
//! Reading fragments from disk, YAML decoding and atomic output are handled
//! by `lamina-adapters`; this layer only ever sees already-parsed trees.
//!
//! - **No async**: everything is synchronous
//! - **No I/O**: no filesystem, no parser; paths are treated lexically
//! - **Immutable values**: all domain objects are Clone + PartialEq

pub mod error;
pub mod filter;
pub mod interpolate;
pub mod merge;
pub mod pathref;
pub mod platform;
pub mod stage;
pub mod value;

pub use error::{DomainError, DomainResult};
pub use filter::filter_tree;
pub use interpolate::interpolate;
pub use merge::merge_layers;
pub use pathref::{PathMode, PathReference, PathStyle};
pub use platform::{SeparatorStyle, normalize_separators};
pub use stage::StageDescriptor;
pub use value::{Mapping, Value};
