//! External process execution with consistent error handling.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run a program in `dir` and return its trimmed stdout on success.
///
/// A non-zero exit becomes an `internal.io_error` carrying stderr (or stdout
/// when stderr is empty). Failure to spawn is reported the same way.
pub fn run_in<I, S>(dir: &Path, program: impl AsRef<OsStr>, args: I, context: &str) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program.as_ref())
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| spawn_error(program.as_ref(), context, e))?;

    finish(output, context)
}

fn spawn_error(program: &OsStr, context: &str, e: std::io::Error) -> Error {
    Error::internal_io(
        format!("Failed to run {} ({}): {}", context, program.to_string_lossy(), e),
        Some(context.to_string()),
    )
}

fn finish(output: Output, context: &str) -> Result<String> {
    if !output.status.success() {
        return Err(Error::internal_io(
            format!("{} failed: {}", context, error_text(&output)),
            Some(context.to_string()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout, then to the exit status.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_string();
    }

    match output.status.code() {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
