//! Handler for `lamina get-config`.

use std::io::Write as _;

use tracing::instrument;

use lamina_adapters::{GetConfigOptions, get_config};
use lamina_adapters::codec::tree_to_display_yaml;

use crate::cli::GetConfigArgs;
use crate::error::CliResult;

/// Print the resolved (and, unless `--all`, stage-filtered) configuration
/// as YAML on stdout.
#[instrument(skip_all, fields(stage = %args.stage))]
pub fn execute(args: GetConfigArgs) -> CliResult<()> {
    let options = GetConfigOptions {
        all: args.all,
        skip_compile: args.skip_compile,
    };
    let tree = get_config(&args.stage, options)?;

    let yaml = tree_to_display_yaml(&tree);
    let text = serde_yaml::to_string(&yaml)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes())?;
    Ok(())
}
