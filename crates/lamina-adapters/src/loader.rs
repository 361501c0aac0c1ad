//! Fragment loading: tag-aware YAML decoding for `params.in.yaml` files.
//!
//! Fragments are the only documents in which the `!path` tag is live. A
//! tagged scalar becomes a [`PathReference`] anchored at the fragment's
//! directory, so the same value can later be re-rendered relative to any
//! destination below it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use lamina_core::prelude::{Mapping, PathReference, Value};

use crate::codec::{key_to_string, number_to_value};
use crate::error::{AdapterError, AdapterResult};

/// Dedup set for "path does not exist" warnings, shared across all
/// fragments of a single run. Keyed on the raw path and the *defining*
/// fragment's directory, so a reference inherited through overlapping
/// ancestor chains warns exactly once no matter how many destinations
/// re-read the fragment.
#[derive(Debug, Default)]
pub struct MissingPathWarnings {
    seen: HashSet<(String, PathBuf)>,
}

impl MissingPathWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    fn warn_once(&mut self, raw: &str, source_dir: &Path, stage: &Path) {
        let key = (raw.to_owned(), source_dir.to_path_buf());
        if self.seen.insert(key) {
            warn!("path {} in stage {} does not exist", raw, stage.display());
        }
    }
}

/// Read and decode the fragment at `fragment_path` for compilation into
/// `destination` (the directory whose `params.yaml` is being produced).
///
/// `destination` must be the fragment's own directory or a descendant;
/// anything else indicates a bookkeeping bug upstream.
pub fn load_fragment(
    fragment_path: &Path,
    destination: &Path,
    project_root: &Path,
    warnings: &mut MissingPathWarnings,
) -> AdapterResult<Mapping> {
    let source_dir = fragment_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .to_path_buf();
    if !destination.starts_with(&source_dir) {
        return Err(AdapterError::DestinationOutsideSource {
            fragment_dir: source_dir,
            destination: destination.to_path_buf(),
        });
    }

    let raw = std::fs::read_to_string(fragment_path)
        .map_err(|e| AdapterError::io(fragment_path, e))?;
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|source| AdapterError::Parse {
            path: fragment_path.to_path_buf(),
            source,
        })?;

    let ctx = FragmentContext {
        fragment_path,
        source_dir: &source_dir,
        // Project-root-relative form of the defining directory, for display.
        stage: source_dir.strip_prefix(project_root).unwrap_or(&source_dir),
    };
    match decode(doc, &ctx, warnings)? {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        other => Err(AdapterError::FragmentNotMapping {
            path: fragment_path.to_path_buf(),
            kind: other.kind(),
        }),
    }
}

struct FragmentContext<'a> {
    fragment_path: &'a Path,
    source_dir: &'a Path,
    stage: &'a Path,
}

fn decode(
    yaml: serde_yaml::Value,
    ctx: &FragmentContext<'_>,
    warnings: &mut MissingPathWarnings,
) -> AdapterResult<Value> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => number_to_value(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| decode(item, ctx, warnings))
                .collect::<AdapterResult<_>>()?,
        ),
        serde_yaml::Value::Mapping(m) => {
            let mut out = Mapping::new();
            for (key, value) in m {
                out.insert(
                    key_to_string(key, ctx.fragment_path)?,
                    decode(value, ctx, warnings)?,
                );
            }
            Value::Mapping(out)
        }
        serde_yaml::Value::Tagged(tagged) if tagged.tag == "path" => {
            let raw = match tagged.value {
                serde_yaml::Value::String(s) => s,
                other => {
                    return Err(AdapterError::PathTagNotScalar {
                        path: ctx.fragment_path.to_path_buf(),
                        kind: yaml_kind(&other),
                    });
                }
            };
            // Templated references can only be checked after interpolation.
            if !raw.contains("{{") && !ctx.source_dir.join(&raw).exists() {
                warnings.warn_once(&raw, ctx.source_dir, ctx.stage);
            }
            Value::Path(PathReference::new(&raw, ctx.source_dir))
        }
        serde_yaml::Value::Tagged(tagged) => decode(tagged.value, ctx, warnings)?,
    })
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}
