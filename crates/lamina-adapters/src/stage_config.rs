//! Per-stage configuration retrieval.
//!
//! A stage locator is `path[:stage_name]`. The path points at a stage
//! directory holding a compiled `params.yaml` and a `dvc.yaml`; the stage
//! name selects one entry under `stages:` when the file defines several.
//! The compiled tree is projected down to the keys the selected stage
//! declares, unless `--all` bypasses filtering.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use lamina_core::prelude::{Mapping, StageDescriptor, Value, filter_tree};

use crate::codec::tree_from_plain_yaml;
use crate::compiler::compile_all_configs;
use crate::error::{AdapterError, AdapterResult};
use crate::project::{SearchCache, get_project_root};
use crate::writer::OUTPUT_FILENAME;

/// Stage descriptor filename read next to the compiled config.
pub const STAGE_FILENAME: &str = "dvc.yaml";

#[derive(Debug, Clone, Copy, Default)]
pub struct GetConfigOptions {
    /// Return the whole compiled tree instead of the stage projection.
    pub all: bool,
    /// Read the existing output without recompiling first.
    pub skip_compile: bool,
}

/// Resolve a stage locator and return the (optionally filtered) compiled
/// configuration for it.
pub fn get_config(stage: &str, options: GetConfigOptions) -> AdapterResult<Mapping> {
    let (path_part, stage_name) = split_stage_locator(stage);
    let stage_dir = resolve_stage_dir(Path::new(path_part))?;

    if !options.skip_compile {
        compile_all_configs(&[stage_dir.clone()])?;
    }

    let config_file = stage_dir.join(OUTPUT_FILENAME);
    let raw = match std::fs::read_to_string(&config_file) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AdapterError::MissingCompiledConfig { dir: stage_dir });
        }
        Err(e) => return Err(AdapterError::io(&config_file, e)),
    };
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|source| AdapterError::Parse {
            path: config_file.clone(),
            source,
        })?;
    let tree = tree_from_plain_yaml(doc, &config_file)?;

    if options.all {
        return Ok(tree);
    }

    let stages = read_stages(&stage_dir)?;
    let descriptor = select_stage(&stages, stage_name)?;
    let keys = descriptor.declared_params();
    info!(
        "stage declares the following parameters: {:?}",
        keys.iter().collect::<Vec<_>>()
    );

    Ok(filter_tree(&tree, &keys)?)
}

/// Split `path[:stage_name]` on the last colon, leaving Windows drive
/// prefixes (`C:\...`, `C:/...`) intact.
pub fn split_stage_locator(locator: &str) -> (&str, Option<&str>) {
    if let Some((path, name)) = locator.rsplit_once(':') {
        let is_drive_colon = path.len() == 1
            && path.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && name.starts_with(['/', '\\']);
        if !is_drive_colon && !name.is_empty() {
            return (path, Some(name));
        }
    }
    (locator, None)
}

/// Map a locator path to the stage directory: absolute paths are taken
/// as-is; relative paths resolve against the working directory first and
/// fall back to the project root.
fn resolve_stage_dir(path: &Path) -> AdapterResult<PathBuf> {
    if path.is_absolute() {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
        return Err(AdapterError::StagePathMissing {
            path: path.to_path_buf(),
        });
    }

    let from_cwd = std::path::absolute(path).map_err(|e| AdapterError::io(path, e))?;
    if from_cwd.is_dir() {
        return Ok(from_cwd);
    }

    let cwd = std::env::current_dir().map_err(|e| AdapterError::io(path, e))?;
    let mut cache = SearchCache::new();
    let project_root = get_project_root(&cwd, &mut cache)?;
    let from_root = project_root.join(path);
    if from_root.is_dir() {
        debug!("resolved stage path {} against the project root", path.display());
        return Ok(from_root);
    }

    Err(AdapterError::StagePathMissing {
        path: path.to_path_buf(),
    })
}

fn read_stages(stage_dir: &Path) -> AdapterResult<Vec<(String, StageDescriptor)>> {
    let path = stage_dir.join(STAGE_FILENAME);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AdapterError::MissingStageFile {
                dir: stage_dir.to_path_buf(),
            });
        }
        Err(e) => return Err(AdapterError::io(&path, e)),
    };
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|source| AdapterError::Parse {
            path: path.clone(),
            source,
        })?;
    let tree = tree_from_plain_yaml(doc, &path)?;

    let mut stages = Vec::new();
    if let Some(Value::Mapping(entries)) = tree.get("stages") {
        for (name, body) in entries {
            let Value::Mapping(body) = body else { continue };
            stages.push((name.clone(), descriptor_from_mapping(body)));
        }
    }
    Ok(stages)
}

fn descriptor_from_mapping(body: &Mapping) -> StageDescriptor {
    StageDescriptor {
        params: string_items(body.get("params")),
        deps: string_items(body.get("deps")),
        outs: string_items(body.get("outs")),
        matrix: body.contains_key("matrix"),
    }
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Sequence(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_owned))
        .collect()
}

fn select_stage<'a>(
    stages: &'a [(String, StageDescriptor)],
    name: Option<&str>,
) -> AdapterResult<&'a StageDescriptor> {
    match (stages, name) {
        ([], _) => Err(AdapterError::NoStages),
        // A single stage needs no disambiguation; a name, if given, is
        // not checked against it.
        ([(_, only)], _) => Ok(only),
        (_, None) => Err(AdapterError::MultipleStages),
        (many, Some(requested)) => many
            .iter()
            .find(|(n, _)| n == requested)
            .map(|(_, d)| d)
            .ok_or_else(|| AdapterError::StageNotFound {
                name: requested.to_owned(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_without_name() {
        assert_eq!(split_stage_locator("a/b"), ("a/b", None));
    }

    #[test]
    fn locator_with_name() {
        assert_eq!(split_stage_locator("a/b:train"), ("a/b", Some("train")));
    }

    #[test]
    fn locator_keeps_windows_drive() {
        assert_eq!(split_stage_locator(r"C:\proj\stage"), (r"C:\proj\stage", None));
        assert_eq!(
            split_stage_locator(r"C:\proj\stage:train"),
            (r"C:\proj\stage", Some("train"))
        );
    }

    #[test]
    fn trailing_colon_is_ignored() {
        assert_eq!(split_stage_locator("a/b:"), ("a/b:", None));
    }

    fn stage(name: &str, params: &[&str]) -> (String, StageDescriptor) {
        (
            name.to_owned(),
            StageDescriptor {
                params: params.iter().map(|s| (*s).to_owned()).collect(),
                deps: Vec::new(),
                outs: Vec::new(),
                matrix: false,
            },
        )
    }

    #[test]
    fn zero_stages_is_an_error() {
        let err = select_stage(&[], None).unwrap_err();
        assert!(matches!(err, AdapterError::NoStages));
    }

    #[test]
    fn single_stage_selected_regardless_of_name() {
        let stages = vec![stage("only", &["a"])];
        assert_eq!(select_stage(&stages, None).unwrap().params, ["a"]);
        assert_eq!(select_stage(&stages, Some("other")).unwrap().params, ["a"]);
    }

    #[test]
    fn multiple_stages_require_a_name() {
        let stages = vec![stage("a", &[]), stage("b", &[])];
        assert!(matches!(
            select_stage(&stages, None).unwrap_err(),
            AdapterError::MultipleStages
        ));
        assert!(select_stage(&stages, Some("b")).is_ok());
        assert!(matches!(
            select_stage(&stages, Some("c")).unwrap_err(),
            AdapterError::StageNotFound { .. }
        ));
    }

    #[test]
    fn descriptor_reads_matrix_presence() {
        let doc: serde_yaml::Value = serde_yaml::from_str(
            "params: [a, item.mp]\ndeps: ['${ b.c }/x']\nmatrix:\n  mp: [1, 2]\n",
        )
        .unwrap();
        let tree = tree_from_plain_yaml(doc, Path::new("dvc.yaml")).unwrap();
        let descriptor = descriptor_from_mapping(&tree);
        assert!(descriptor.matrix);
        let keys = descriptor.declared_params();
        assert!(keys.contains("a"));
        assert!(keys.contains("b.c"));
        assert!(!keys.contains("item.mp"));
    }
}
