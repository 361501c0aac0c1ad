//! Lamina Core - Hierarchical Configuration Compiler
//!
//! This crate provides the domain layer for the Lamina configuration
//! compiler: the pure algorithms that turn a chain of per-directory
//! configuration fragments into one resolved document.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           lamina-cli (CLI)              │
//! │     (compile / get-config commands)     │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      lamina-adapters (Infrastructure)   │
//! │  (discovery, fragment I/O, atomic write)│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Value, PathReference, merge, filter,  │
//! │   interpolation, stage descriptors)     │
//! │         No I/O, no YAML parser          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use lamina_core::prelude::*;
//!
//! // Merge a root fragment with a more specific one (leaf wins).
//! let root: Mapping = [("value".into(), Value::from("root"))].into_iter().collect();
//! let leaf: Mapping = [("value".into(), Value::from("leaf"))].into_iter().collect();
//! let merged = merge_layers([root, leaf]);
//! assert_eq!(merged["value"], Value::from("leaf"));
//! ```

// Domain layer (stable, well-defined API)
pub mod domain;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::domain::{
        DomainError, DomainResult, Mapping, PathMode, PathReference, PathStyle, SeparatorStyle,
        StageDescriptor, Value, filter_tree, interpolate, merge_layers, normalize_separators,
    };
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
