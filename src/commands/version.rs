use clap::Args;
use serde::Serialize;

use rcpack::paths;
use rcpack::version::{self, VersionInfo};

use super::CmdResult;

#[derive(Args)]
pub struct VersionArgs {
    /// Build configuration file (overrides collect.version_file)
    #[arg(long)]
    pub file: Option<String>,

    /// Marker key (overrides collect.version_key)
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum VersionOutput {
    #[serde(rename = "version.show")]
    Show {
        #[serde(flatten)]
        info: VersionInfo,
        tool_version: String,
    },
}

pub fn run(args: VersionArgs, global: &crate::commands::GlobalArgs) -> CmdResult<VersionOutput> {
    let collect = global.load_config()?.config.collect;
    let file = args.file.unwrap_or(collect.version_file);
    let key = args.key.unwrap_or(collect.version_key);

    let info = version::show(&paths::expand(&file), &key)?;

    Ok((
        VersionOutput::Show {
            info,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        0,
    ))
}
