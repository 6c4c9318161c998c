use std::path::PathBuf;

use rcpack::defaults::{self, LoadedConfig};

pub use rcpack::output::CmdResult;

pub(crate) struct GlobalArgs {
    /// Explicit config file (`--config`); None = lookup order.
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    pub(crate) fn load_config(&self) -> rcpack::Result<LoadedConfig> {
        defaults::load(self.config.as_deref())
    }
}

pub mod auth;
pub mod collect;
pub mod config;
pub mod vendors;
pub mod version;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (rcpack::Result<serde_json::Value>, i32) {
    crate::tty::status("rcpack is working...");

    match command {
        crate::Commands::Collect(args) => dispatch!(args, global, collect),
        crate::Commands::Vendors(args) => dispatch!(args, global, vendors),
        crate::Commands::Version(args) => dispatch!(args, global, version),
        crate::Commands::Config(args) => dispatch!(args, global, config),
        crate::Commands::Auth(args) => dispatch!(args, global, auth),
    }
}
