//! Compilation orchestration: turn every relevant `params.in.yaml` into
//! its resolved `params.yaml`.
//!
//! For each fragment the merge chain is the fragment plus all ancestor
//! fragments up to the project root, outermost first, so inner values
//! override inherited ones. Path references are re-rendered for the
//! destination directory, templates are interpolated on the merged tree,
//! and the result is written atomically next to the fragment.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use lamina_core::prelude::{
    PathMode, PathStyle, SeparatorStyle, interpolate, merge_layers,
};

use crate::discovery::{ancestor_chain, discover_fragments};
use crate::error::{AdapterError, AdapterResult};
use crate::loader::{MissingPathWarnings, load_fragment};
use crate::project::{ProjectSettings, SearchCache, check_project_roots};
use crate::writer::{OUTPUT_FILENAME, write_compiled};

/// Outcome of a compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileSummary {
    /// Fragments processed.
    pub total: usize,
    /// Output files actually (re)written.
    pub updated: usize,
}

/// Compile every fragment relevant to `paths` (files are taken as their
/// containing directory). All paths must share one project root.
pub fn compile_all_configs(paths: &[PathBuf]) -> AdapterResult<CompileSummary> {
    let mut dirs = Vec::with_capacity(paths.len());
    for path in paths {
        let mut abs = std::path::absolute(path).map_err(|e| AdapterError::io(path, e))?;
        if abs.is_file() {
            abs.pop();
        }
        dirs.push(abs);
    }

    let mut cache = SearchCache::new();
    let mut warnings = MissingPathWarnings::new();

    let project_root = check_project_roots(&dirs, &mut cache)?;
    info!("detected {} as project root", project_root.display());

    let settings = ProjectSettings::load(&project_root)?;
    let mode = if settings.use_relative_paths {
        PathMode::Relative
    } else {
        PathMode::Absolute
    };

    let fragments = discover_fragments(&dirs, &project_root, &mut cache)?;
    info!("compiling a total of {} config files", fragments.len());

    let mut updated = 0;
    for fragment in &fragments {
        let destination = fragment
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();

        let mut layers = Vec::new();
        for layer in ancestor_chain(fragment, &fragments) {
            layers.push(load_fragment(&layer, &destination, &project_root, &mut warnings)?);
        }
        let mut tree = merge_layers(layers);

        let style = PathStyle::new(&destination, mode);
        interpolate(&mut tree, &style)?;

        let yaml = crate::codec::tree_to_output_yaml(&tree, &style, SeparatorStyle::native());
        let body = serde_yaml::to_string(&yaml).map_err(|source| AdapterError::Parse {
            path: fragment.clone(),
            source,
        })?;

        let out_file = destination.join(OUTPUT_FILENAME);
        if write_compiled(&out_file, &body)? {
            updated += 1;
            debug!("compiled {}", out_file.display());
        } else {
            debug!("{} is up to date", out_file.display());
        }
    }

    info!("configuration compiled successfully");
    Ok(CompileSummary {
        total: fragments.len(),
        updated,
    })
}
