use std::ffi::OsStr;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::command;

/// Clone `url` into `target_dir`, run from `work_dir`.
pub fn clone_repo(work_dir: &Path, url: &str, target_dir: &Path) -> Result<()> {
    command::run_in(
        work_dir,
        "git",
        [OsStr::new("clone"), OsStr::new(url), target_dir.as_os_str()],
        "git clone",
    )
    .map_err(|e| Error::git_command_failed(e.detail_text()))?;
    Ok(())
}
