use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the configuration file, both project-local and per-user.
pub const CONFIG_FILE_NAME: &str = "rcpack.json";

/// Base rcpack config directory (~/.config/rcpack/ on Unix, %APPDATA%\rcpack on Windows)
pub fn rcpack() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("rcpack"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("rcpack"))
    }
}

/// Per-user rcpack.json path
pub fn user_config() -> Result<PathBuf> {
    Ok(rcpack()?.join(CONFIG_FILE_NAME))
}

/// Project-local rcpack.json, looked up in the working directory
pub fn local_config() -> PathBuf {
    PathBuf::from(".").join(CONFIG_FILE_NAME)
}

/// Expand a leading `~` in a configured path.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// Release output directory for a version: `<build_dir>/release_<version>`
pub fn release_dir(build_dir: &Path, version: &str) -> PathBuf {
    build_dir.join(format!("release_{}", version))
}

/// Checkout directory name for a repository URL (basename without `.git`).
pub fn repo_checkout_name(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let base = trimmed.rsplit(|c: char| c == '/' || c == ':').next()?;
    let name = base.strip_suffix(".git").unwrap_or(base);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
