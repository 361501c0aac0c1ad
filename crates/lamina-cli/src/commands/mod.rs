//! Command handlers, one module per subcommand.

pub mod compile;
pub mod get_config;
