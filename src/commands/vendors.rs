use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use rcpack::paths;
use rcpack::vendor::{self, FetchReport, GitCloner};

use super::CmdResult;

#[derive(Args)]
pub struct VendorsArgs {
    /// Resources directory that receives `profiles/<vendor>` bundles
    pub out_dir: PathBuf,

    /// Directory repositories are cloned into (overrides vendor.work_dir)
    #[arg(long)]
    pub work_dir: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum VendorsOutput {
    #[serde(rename = "vendors.fetch")]
    Fetch {
        #[serde(flatten)]
        report: FetchReport,
    },
}

pub fn run(args: VendorsArgs, global: &crate::commands::GlobalArgs) -> CmdResult<VendorsOutput> {
    let config = global.load_config()?.config;
    let work_dir = paths::expand(args.work_dir.as_deref().unwrap_or(&config.vendor.work_dir));

    let report = vendor::fetch_bundles(
        &args.out_dir,
        &config.vendor.repositories,
        &work_dir,
        &GitCloner,
    )?;

    Ok((VendorsOutput::Fetch { report }, 0))
}
