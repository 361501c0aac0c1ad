//! The merge-tree value model.
//!
//! A configuration document is an ordered mapping from string keys to
//! [`Value`]s. Ordering matters: the compiled output must preserve the
//! order keys first appear across the ancestor chain, and the filter must
//! project sub-trees in source order. [`indexmap::IndexMap`] gives us
//! exactly that insertion-order guarantee.
//!
//! `!path`-tagged scalars are represented as a dedicated [`Value::Path`]
//! variant rather than a parser plugin: serialization and interpolation
//! each handle the variant explicitly.

use indexmap::IndexMap;

use super::pathref::PathReference;

/// Ordered mapping used at every level of a configuration tree.
pub type Mapping = IndexMap<String, Value>;

/// A single configuration value.
///
/// `Null` is significant: an explicit `null` in a descendant fragment is a
/// tombstone that erases whatever an ancestor supplied (see
/// [`merge`](super::merge)). Absent keys, by contrast, inherit as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A relocatable path reference (`!path` in the source fragment).
    Path(PathReference),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Path(_) => "path",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
