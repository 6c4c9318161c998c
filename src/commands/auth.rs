use clap::{Args, Subcommand};
use serde::Serialize;

use rcpack::github::{self, TokenSource};
use rcpack::keychain;

use super::CmdResult;

#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommand,
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Store an API token in the system keychain
    Set {
        /// Personal access token with `actions:read` scope
        token: String,
    },
    /// Show where the active token comes from
    Status,
    /// Remove the stored token from the keychain
    Clear,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum AuthOutput {
    #[serde(rename = "auth.set")]
    Set { repo: String },
    #[serde(rename = "auth.status")]
    Status {
        repo: String,
        authenticated: bool,
        source: TokenSource,
    },
    #[serde(rename = "auth.clear")]
    Clear { repo: String, removed: bool },
}

pub fn run(args: AuthArgs, global: &crate::commands::GlobalArgs) -> CmdResult<AuthOutput> {
    let config = global.load_config()?.config;
    let repo = config.github.repo.clone();

    match args.command {
        AuthCommand::Set { token } => {
            let token = token.trim();
            if token.is_empty() {
                return Err(rcpack::Error::validation_invalid_argument(
                    "token",
                    "Token cannot be empty",
                    None,
                    None,
                ));
            }
            keychain::store(&repo, token)?;
            Ok((AuthOutput::Set { repo }, 0))
        }
        AuthCommand::Status => {
            let (token, source) = github::resolve_token(&config.github);
            Ok((
                AuthOutput::Status {
                    repo,
                    authenticated: token.is_some(),
                    source,
                },
                0,
            ))
        }
        AuthCommand::Clear => {
            let removed = keychain::delete(&repo)?;
            Ok((AuthOutput::Clear { repo, removed }, 0))
        }
    }
}
