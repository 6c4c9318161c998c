use clap::Args;
use serde::Serialize;

use rcpack::collect::{self, CollectReport};

use super::CmdResult;

#[derive(Args)]
pub struct CollectArgs {
    /// Override the page bound of the artifact listing
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u32>,

    /// Use the built-in zip writer instead of the configured compression tool
    #[arg(long)]
    pub builtin_zip: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum CollectOutput {
    #[serde(rename = "collect")]
    Collect {
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<String>,
        #[serde(flatten)]
        report: CollectReport,
    },
}

pub fn run(args: CollectArgs, global: &crate::commands::GlobalArgs) -> CmdResult<CollectOutput> {
    let loaded = global.load_config()?;
    let mut config = loaded.config;

    if let Some(max_pages) = args.max_pages {
        if max_pages == 0 {
            return Err(rcpack::Error::validation_invalid_argument(
                "max_pages",
                "must be at least 1",
                Some("0".to_string()),
                None,
            ));
        }
        config.collect.max_pages = max_pages;
    }
    if args.builtin_zip {
        config.collect.compress_tool = None;
    }

    let report = collect::run(&config)?;

    Ok((
        CollectOutput::Collect {
            config_path: loaded.source.map(|p| p.display().to_string()),
            report,
        },
        0,
    ))
}
