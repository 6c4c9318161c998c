use clap::{Args, Subcommand};
use serde::Serialize;

use rcpack::defaults::{self, RcpackConfig};
use rcpack::paths;

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display the effective configuration (file merged over defaults)
    Show {
        /// Show only built-in defaults (ignore rcpack.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Show the path of the per-user rcpack.json
    Path,
    /// Write built-in defaults to the per-user rcpack.json
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Reset configuration to built-in defaults (deletes the per-user rcpack.json)
    Reset,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<RcpackConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

impl ConfigOutput {
    fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            config: None,
            source: None,
            path: None,
            exists: None,
            deleted: None,
        }
    }
}

pub fn run(args: ConfigArgs, global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin, global),
        ConfigCommand::Path => path(),
        ConfigCommand::Init { force } => init(force),
        ConfigCommand::Reset => reset(),
    }
}

fn show(builtin: bool, global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    let mut output = ConfigOutput::new("config.show");

    if builtin {
        output.config = Some(RcpackConfig::default());
    } else {
        let loaded = global.load_config()?;
        output.source = loaded.source.map(|p| p.display().to_string());
        output.config = Some(loaded.config);
    }

    Ok((output, 0))
}

fn path() -> CmdResult<ConfigOutput> {
    let path = paths::user_config()?;
    let mut output = ConfigOutput::new("config.path");
    output.exists = Some(path.exists());
    output.path = Some(path.display().to_string());
    Ok((output, 0))
}

fn init(force: bool) -> CmdResult<ConfigOutput> {
    let existing = paths::user_config()?;
    if existing.exists() && !force {
        return Err(rcpack::Error::validation_invalid_argument(
            "config",
            "Config file already exists",
            Some(existing.display().to_string()),
            None,
        )
        .with_hint("Pass --force to overwrite it with built-in defaults"));
    }

    let written = defaults::save_user_config(&RcpackConfig::default())?;
    let mut output = ConfigOutput::new("config.init");
    output.path = Some(written.display().to_string());
    output.exists = Some(true);
    Ok((output, 0))
}

fn reset() -> CmdResult<ConfigOutput> {
    let deleted = defaults::reset_user_config()?;
    let mut output = ConfigOutput::new("config.reset");
    output.path = Some(paths::user_config()?.display().to_string());
    output.deleted = Some(deleted);
    Ok((output, 0))
}
