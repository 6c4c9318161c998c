//! Vendor profile bundle fetcher.
//!
//! Each configured repository holds one vendor's printer profiles: a
//! `description.ini` naming the vendor id, `profiles/<id>.ini` and the
//! `profiles/<id>/` resource directory. Both are copied into a resources tree.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::git;
use crate::parser;
use crate::paths;
use crate::utils::io;

const DESCRIPTION_FILE: &str = "description.ini";
const PROFILES_DIR: &str = "profiles";

/// Puts a repository checkout on disk.
pub trait RepoCloner {
    /// Clone `url` into `work_dir/<checkout>`.
    fn clone_repo(&self, work_dir: &Path, url: &str, checkout: &str) -> Result<()>;
}

/// Clones with the `git` executable.
pub struct GitCloner;

impl RepoCloner for GitCloner {
    fn clone_repo(&self, work_dir: &Path, url: &str, checkout: &str) -> Result<()> {
        git::clone_repo(work_dir, url, Path::new(checkout))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorBundle {
    pub vendor_id: String,
    pub repository: String,
    pub profile_file: String,
    pub profile_dir: String,
    /// Set when the clone failed and an earlier checkout was used instead.
    pub reused_checkout: bool,
    /// Whether an older copy of the profile directory was replaced.
    pub replaced: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloneFailure {
    pub repository: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub out_dir: String,
    pub bundles: Vec<VendorBundle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CloneFailure>,
}

/// Read the vendor id from a checkout's `description.ini`.
pub fn vendor_id(checkout: &Path) -> Result<String> {
    let path = checkout.join(DESCRIPTION_FILE);
    let content = io::read_file(&path, "read vendor description")?;

    parser::ini_value(&content, "vendor", "id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            Error::config_missing_key("vendor.id", Some(path.display().to_string()))
        })
}

/// Clone every repository and copy its vendor profile into
/// `<out_dir>/profiles/`.
pub fn fetch_bundles(
    out_dir: &Path,
    repositories: &[String],
    work_dir: &Path,
    cloner: &dyn RepoCloner,
) -> Result<FetchReport> {
    if !out_dir.is_dir() {
        return Err(Error::validation_invalid_argument(
            "out_dir",
            "Output directory does not exist",
            Some(out_dir.display().to_string()),
            None,
        )
        .with_hint("Pass the path of the resources directory, e.g. ./resources"));
    }

    if repositories.is_empty() {
        log_status!("vendors", "No vendor repositories configured");
    }

    let profiles_out = out_dir.join(PROFILES_DIR);
    let mut report = FetchReport {
        out_dir: out_dir.display().to_string(),
        bundles: Vec::new(),
        failures: Vec::new(),
    };

    for url in repositories {
        let checkout_name = paths::repo_checkout_name(url).ok_or_else(|| {
            Error::validation_invalid_argument(
                "vendor.repositories",
                "Cannot derive a checkout name from repository URL",
                Some(url.clone()),
                None,
            )
        })?;
        let checkout = work_dir.join(&checkout_name);

        log_status!("vendors", "Cloning {}", url);
        let mut reused_checkout = false;
        if let Err(err) = cloner.clone_repo(work_dir, url, &checkout_name) {
            let error = err.detail_text();
            log_status!("vendors", "Clone of {} failed: {}", url, error);
            report.failures.push(CloneFailure {
                repository: url.clone(),
                error,
            });

            if !checkout.join(DESCRIPTION_FILE).is_file() {
                continue;
            }
            log_status!("vendors", "Using existing checkout {}", checkout.display());
            reused_checkout = true;
        }

        let bundle = copy_bundle(&checkout, url, &profiles_out, reused_checkout)?;
        log_status!("vendors", "Copied vendor {}", bundle.vendor_id);
        report.bundles.push(bundle);
    }

    Ok(report)
}

fn copy_bundle(
    checkout: &Path,
    url: &str,
    profiles_out: &Path,
    reused_checkout: bool,
) -> Result<VendorBundle> {
    let id = vendor_id(checkout)?;
    let source_profiles = checkout.join(PROFILES_DIR);

    io::create_dir_all(profiles_out)?;

    let file_name = format!("{}.ini", id);
    let profile_file: PathBuf = profiles_out.join(&file_name);
    io::copy_file(&source_profiles.join(&file_name), &profile_file)?;

    let profile_dir = profiles_out.join(&id);
    let replaced = io::remove_dir_if_exists(&profile_dir)?;
    io::copy_dir_recursive(&source_profiles.join(&id), &profile_dir)?;

    Ok(VendorBundle {
        vendor_id: id,
        repository: url.to_string(),
        profile_file: profile_file.display().to_string(),
        profile_dir: profile_dir.display().to_string(),
        reused_checkout,
        replaced,
    })
}
