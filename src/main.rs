use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod tty;

use commands::{auth, collect, config, vendors, version, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "rcpack")]
#[command(version = VERSION)]
#[command(about = "Package release-candidate CI artifacts and vendor profile bundles")]
struct Cli {
    /// Use this rcpack.json instead of the default lookup
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and repackage the latest release-candidate artifacts
    Collect(collect::CollectArgs),
    /// Clone vendor profile repositories into a resources directory
    Vendors(vendors::VendorsArgs),
    /// Show the version read from the build configuration file
    Version(version::VersionArgs),
    /// Manage rcpack configuration
    Config(config::ConfigArgs),
    /// Manage the artifact API token
    Auth(auth::AuthArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs { config: cli.config };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
