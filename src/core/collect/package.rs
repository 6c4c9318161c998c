//! Unpack a downloaded artifact and apply its package action.

use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::spec::{ArtifactSpec, PackageAction, UnpackTarget};
use crate::error::Result;
use crate::utils::{archive, command, io};

/// How a directory is turned into a zip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compressor {
    /// External tool called as `<tool> a -tzip <name>.zip <name>`.
    External(String),
    Builtin,
}

impl Compressor {
    pub fn from_tool(tool: Option<&str>) -> Self {
        match tool.map(str::trim) {
            Some(tool) if !tool.is_empty() => Compressor::External(tool.to_string()),
            _ => Compressor::Builtin,
        }
    }

    /// Zip `parent/<name>` into `parent/<name>.zip`.
    pub fn compress(&self, parent: &Path, name: &str) -> Result<PathBuf> {
        let archive_name = format!("{}.zip", name);
        let archive_path = parent.join(&archive_name);

        match self {
            Compressor::External(tool) => {
                command::run_in(
                    parent,
                    tool,
                    [
                        OsStr::new("a"),
                        OsStr::new("-tzip"),
                        OsStr::new(&archive_name),
                        OsStr::new(name),
                    ],
                    "zip release directory",
                )?;
            }
            Compressor::Builtin => {
                archive::zip_directory(&parent.join(name), &archive_path)?;
            }
        }

        Ok(archive_path)
    }
}

/// Outcome for one handled artifact.
#[derive(Debug, Clone, Serialize)]
pub struct PackagedArtifact {
    pub name: String,
    pub label: String,
    pub unpacked_to: String,
    pub entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub packaged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Unpack `bytes` for `spec` under `release_dir` and run its package action.
///
/// A compression failure is recorded as a warning and leaves the directory
/// unpacked; any other failure is returned.
pub fn package(
    bytes: &[u8],
    spec: &ArtifactSpec,
    release_dir: &Path,
    compressor: &Compressor,
) -> Result<PackagedArtifact> {
    let unpack_dir = match &spec.unpack {
        UnpackTarget::ReleaseDir => release_dir.to_path_buf(),
        UnpackTarget::Subdir { dir } => release_dir.join(dir),
    };

    let entries = archive::extract_bytes(bytes, &unpack_dir)?;

    let mut result = PackagedArtifact {
        name: spec.name.clone(),
        label: spec.label.clone(),
        unpacked_to: unpack_dir.display().to_string(),
        entries,
        output: None,
        packaged: true,
        warning: None,
    };

    match &spec.package {
        PackageAction::None => {}
        PackageAction::Compress { dir } => match compressor.compress(release_dir, dir) {
            Ok(path) => {
                log_status!("collect", "Zipped {}", path.display());
                result.output = Some(path.display().to_string());
            }
            Err(err) => {
                let detail = err.detail_text();
                log_status!(
                    "collect",
                    "Failed to zip the {} directory, do it yourself: {}",
                    spec.label,
                    detail
                );
                result.packaged = false;
                result.warning = Some(format!("Failed to zip {}: {}", dir, detail));
            }
        },
        PackageAction::Rename { from, to } => {
            let target = release_dir.join(to);
            io::rename(&release_dir.join(from), &target)?;
            log_status!("collect", "Renamed {} -> {}", from, to);
            result.output = Some(target.display().to_string());
        }
    }

    Ok(result)
}
