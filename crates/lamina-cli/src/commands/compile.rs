//! Handler for `lamina compile`.

use std::path::PathBuf;

use tracing::{debug, instrument};

use lamina_adapters::compile_all_configs;

use crate::cli::CompileArgs;
use crate::error::CliResult;

/// Compile every fragment under the requested paths (default: the current
/// directory).
#[instrument(skip_all)]
pub fn execute(args: CompileArgs) -> CliResult<()> {
    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths
    };

    let summary = compile_all_configs(&paths)?;
    debug!(
        total = summary.total,
        updated = summary.updated,
        "compile finished"
    );
    Ok(())
}
