//! Release version lookup from the build-configuration file.

use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::utils::{io, parser};

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub file: String,
    pub key: String,
}

/// Return the quoted value on the first line mentioning `key`.
///
/// An empty string means no line matched.
pub fn parse_version(content: &str, key: &str) -> String {
    parser::quoted_value_after(content, key).unwrap_or_default()
}

/// Read `path` and parse the version from it.
pub fn read_version(path: &Path, key: &str) -> Result<String> {
    let content = io::read_file(path, "read version file")?;
    Ok(parse_version(&content, key))
}

pub fn show(path: &Path, key: &str) -> Result<VersionInfo> {
    Ok(VersionInfo {
        version: read_version(path, key)?,
        file: path.display().to_string(),
        key: key.to_string(),
    })
}
