use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collect::spec::{default_artifacts, ArtifactSpec};
use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

/// Root configuration structure for rcpack.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RcpackConfig {
    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub collect: CollectConfig,

    #[serde(default)]
    pub vendor: VendorConfig,
}

/// Where artifacts are listed and how requests authenticate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_repo")]
    pub repo: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Plain-text token; prefer GITHUB_TOKEN or the keychain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            api_base: default_api_base(),
            token: None,
        }
    }
}

/// Artifact collector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    #[serde(default = "default_program_name")]
    pub program_name: String,

    #[serde(default = "default_rc_branch")]
    pub rc_branch: String,

    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default = "default_version_key")]
    pub version_key: String,

    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// External zip tool; `null` selects the built-in zip writer.
    #[serde(default = "default_compress_tool")]
    pub compress_tool: Option<String>,

    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<ArtifactSpec>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            program_name: default_program_name(),
            rc_branch: default_rc_branch(),
            max_pages: default_max_pages(),
            version_file: default_version_file(),
            version_key: default_version_key(),
            build_dir: default_build_dir(),
            compress_tool: default_compress_tool(),
            artifacts: default_artifacts(),
        }
    }
}

/// Vendor bundle fetcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    #[serde(default)]
    pub repositories: Vec<String>,

    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            work_dir: default_work_dir(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_repo() -> String {
    "supermerill/SuperSlicer".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_program_name() -> String {
    "SuperSlicer".to_string()
}

fn default_rc_branch() -> String {
    "rc".to_string()
}

fn default_max_pages() -> u32 {
    9
}

fn default_version_file() -> String {
    "./version.inc".to_string()
}

fn default_version_key() -> String {
    "SLIC3R_VERSION_FULL".to_string()
}

fn default_build_dir() -> String {
    "./build".to_string()
}

#[cfg(windows)]
fn default_compress_tool() -> Option<String> {
    Some(r"C:\Program Files\7-Zip\7z.exe".to_string())
}

#[cfg(not(windows))]
fn default_compress_tool() -> Option<String> {
    Some("7z".to_string())
}

fn default_work_dir() -> String {
    ".".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// A loaded configuration and the file it came from (None = built-in defaults).
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RcpackConfig,
    pub source: Option<PathBuf>,
}

/// Load configuration.
///
/// An explicit path must exist. Otherwise `./rcpack.json` then the per-user
/// file are tried, and built-in defaults are used when neither exists.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::validation_invalid_argument(
                "config",
                format!("Config file not found: {}", path.display()),
                Some(path.display().to_string()),
                None,
            ));
        }
        return load_from(path);
    }

    let mut candidates = vec![paths::local_config()];
    if let Ok(user) = paths::user_config() {
        candidates.push(user);
    }

    for candidate in candidates {
        if candidate.exists() {
            return load_from(&candidate);
        }
    }

    Ok(LoadedConfig {
        config: RcpackConfig::default(),
        source: None,
    })
}

fn load_from(path: &Path) -> Result<LoadedConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    let config: RcpackConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    validate(&config)?;

    Ok(LoadedConfig {
        config,
        source: Some(path.to_path_buf()),
    })
}

fn validate(config: &RcpackConfig) -> Result<()> {
    if config.collect.max_pages == 0 {
        return Err(Error::config_invalid_value(
            "collect.max_pages",
            Some("0".to_string()),
            "must be at least 1",
        ));
    }

    if config.github.repo.split('/').filter(|p| !p.is_empty()).count() != 2 {
        return Err(Error::config_invalid_value(
            "github.repo",
            Some(config.github.repo.clone()),
            "expected <owner>/<name>",
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for spec in &config.collect.artifacts {
        if !seen.insert(spec.name.as_str()) {
            return Err(Error::config_invalid_value(
                "collect.artifacts",
                Some(spec.name.clone()),
                "artifact names must be unique",
            ));
        }
    }

    Ok(())
}

/// Write `config` to the per-user config file (creates if missing).
pub fn save_user_config(config: &RcpackConfig) -> Result<PathBuf> {
    let path = paths::user_config()?;

    if let Some(parent) = path.parent() {
        io::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        Error::internal_json(e.to_string(), Some("serialize rcpack.json".to_string()))
    })?;

    io::write_file(&path, &content, "write")?;

    Ok(path)
}

/// Delete the per-user config file (reset to defaults)
pub fn reset_user_config() -> Result<bool> {
    let path = paths::user_config()?;

    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}
