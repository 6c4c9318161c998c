//! Release-candidate artifact collector.
//!
//! Prepares `<build_dir>/release_<version>`, scans the CI artifact listing for
//! the day's release-candidate builds and repackages each expected artifact
//! according to the artifact table.

pub mod package;
pub mod scan;
pub mod spec;

use chrono::Local;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::defaults::RcpackConfig;
use crate::error::{Error, Result};
use crate::github::{self, ArtifactSource, GithubClient, TokenSource};
use crate::paths;
use crate::utils::io;
use crate::version;

pub use package::{Compressor, PackagedArtifact};
pub use scan::{ScanOptions, ScanSummary, StopReason};
pub use spec::{ArtifactSpec, NamingVars, PackageAction, UnpackTarget};

/// Everything a collection run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct CollectPlan {
    pub version: String,
    pub date: String,
    pub release_dir: PathBuf,
    pub specs: Vec<ArtifactSpec>,
    pub options: ScanOptions,
    pub compressor: Compressor,
    /// Setup findings carried into the report.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    pub version: String,
    pub date: String,
    pub release_dir: String,
    pub cleaned_previous: bool,
    #[serde(flatten)]
    pub scan: ScanSummary,
    pub artifacts: Vec<PackagedArtifact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

/// Today's date stamp as used in release file names (`%y%m%d`).
pub fn date_stamp() -> String {
    Local::now().format("%y%m%d").to_string()
}

/// Read the version and render the artifact table for `date`.
pub fn prepare(config: &RcpackConfig, date: &str) -> Result<CollectPlan> {
    let collect = &config.collect;
    let version_file = paths::expand(&collect.version_file);
    let version = version::read_version(&version_file, &collect.version_key)?;

    if version.is_empty() {
        return Err(Error::config_missing_key(
            collect.version_key.clone(),
            Some(version_file.display().to_string()),
        )
        .with_hint("Run rcpack from the repository root or set collect.version_file"));
    }

    let warnings: Vec<String> = collect
        .artifacts
        .iter()
        .filter(|spec| spec.lacks_version())
        .map(|spec| format!("Output of {} does not embed the version", spec.name))
        .collect();
    for warning in &warnings {
        log_status!("collect", "{}", warning);
    }

    let vars = NamingVars {
        program: collect.program_name.clone(),
        version: version.clone(),
        date: date.to_string(),
    };

    let specs = spec::render_all(&collect.artifacts, &vars);
    if let Some(duplicate) = first_duplicate_name(&specs) {
        return Err(Error::config_invalid_value(
            "collect.artifacts",
            Some(duplicate),
            "artifact names must be unique after rendering",
        ));
    }

    Ok(CollectPlan {
        release_dir: paths::release_dir(&paths::expand(&collect.build_dir), &version),
        version,
        date: date.to_string(),
        specs,
        options: ScanOptions {
            rc_branch: collect.rc_branch.clone(),
            max_pages: collect.max_pages,
        },
        compressor: Compressor::from_tool(collect.compress_tool.as_deref()),
        warnings,
    })
}

fn first_duplicate_name(specs: &[ArtifactSpec]) -> Option<String> {
    let mut seen = HashSet::new();
    specs
        .iter()
        .find(|spec| !seen.insert(spec.name.as_str()))
        .map(|spec| spec.name.clone())
}

/// Recreate the release directory, then scan `source` and package every
/// artifact taken.
pub fn execute<S>(plan: &CollectPlan, source: &S) -> Result<CollectReport>
where
    S: ArtifactSource + ?Sized,
{
    log_status!("collect", "Create release for: {}", plan.version);

    let cleaned_previous = io::recreate_dir(&plan.release_dir)?;
    if cleaned_previous {
        log_status!("collect", "Deleted old {}", plan.release_dir.display());
    }

    let mut warnings = plan.warnings.clone();

    let mut artifacts = Vec::new();
    let summary = scan::scan(source, &plan.specs, &plan.options, |artifact, spec| {
        log_status!("collect", "Downloading {}", artifact.archive_download_url);
        let bytes = source.download(artifact)?;
        let packaged = package::package(&bytes, spec, &plan.release_dir, &plan.compressor)?;
        artifacts.push(packaged);
        Ok(())
    })?;

    warnings.extend(artifacts.iter().filter_map(|a| a.warning.clone()));
    if !summary.missing.is_empty() {
        warnings.push(format!(
            "Not found for this release: {}",
            summary.missing.join(", ")
        ));
    }

    Ok(CollectReport {
        version: plan.version.clone(),
        date: plan.date.clone(),
        release_dir: plan.release_dir.display().to_string(),
        cleaned_previous,
        scan: summary,
        artifacts,
        warnings,
        hints: vec!["Don't forget to push your master branch".to_string()],
    })
}

/// Run a full collection against the configured GitHub repository.
pub fn run(config: &RcpackConfig) -> Result<CollectReport> {
    let plan = prepare(config, &date_stamp())?;

    let (token, token_source) = github::resolve_token(&config.github);
    if token_source == TokenSource::None {
        log_status!(
            "collect",
            "No API token found; artifact downloads will likely be refused"
        );
    }

    let client = GithubClient::new(&config.github, token.as_deref())?;
    execute(&plan, &client)
}

#[cfg(test)]
mod tests {
    use super::scan::tests::{artifact, PagedSource};
    use super::*;
    use crate::github::{Artifact, ArtifactPage};
    use crate::utils::archive::tests::zip_bytes;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Listing from `PagedSource`, archives from a name -> zip map.
    struct FakeGithub {
        listing: PagedSource,
        archives: HashMap<String, Vec<u8>>,
    }

    impl ArtifactSource for FakeGithub {
        fn fetch_page(&self, page: u32) -> Result<ArtifactPage> {
            self.listing.fetch_page(page)
        }

        fn download(&self, artifact: &Artifact) -> Result<Vec<u8>> {
            self.archives
                .get(&artifact.name)
                .cloned()
                .ok_or_else(|| Error::remote_status(&artifact.archive_download_url, 404, ""))
        }
    }

    fn config_in(root: &Path) -> RcpackConfig {
        let mut config = RcpackConfig::default();
        config.collect.version_file = root.join("version.inc").display().to_string();
        config.collect.build_dir = root.join("build").display().to_string();
        config.collect.compress_tool = None;
        config
    }

    fn write_version(root: &Path) {
        fs::write(
            root.join("version.inc"),
            "set(SLIC3R_VERSION_FULL \"2.5.59\")\n",
        )
        .unwrap();
    }

    fn full_release() -> FakeGithub {
        let day = "2024-01-10";
        let listing = PagedSource::new(vec![
            vec![
                artifact("nightly_win64", "2024-01-11", "dev"),
                artifact("rc_win64", day, "rc"),
                artifact("rc_SuperSlicer-macOS.dmg", day, "rc"),
                artifact("rc_SuperSlicer-macOS-arm.dmg", day, "rc"),
            ],
            vec![
                artifact("rc_SuperSlicer-linux-x64-GTK2.AppImage", day, "rc"),
                artifact("rc_SuperSlicer-linux-x64-GTK3.AppImage", day, "rc"),
                artifact("rc_SuperSlicer-linux-x64-GTK3.tgz", day, "rc"),
                artifact("rc_win64", "2024-01-09", "rc"),
            ],
        ]);

        let archives = [
            ("rc_win64", "superslicer.exe"),
            ("rc_SuperSlicer-macOS.dmg", "SuperSlicer-macOS-intel.dmg"),
            ("rc_SuperSlicer-macOS-arm.dmg", "SuperSlicer-macOS-arm.dmg"),
            ("rc_SuperSlicer-linux-x64-GTK2.AppImage", "SuperSlicer-linux-x64-GTK2.AppImage"),
            ("rc_SuperSlicer-linux-x64-GTK3.AppImage", "SuperSlicer-linux-x64-GTK3.AppImage"),
            ("rc_SuperSlicer-linux-x64-GTK3.tgz", "SuperSlicer-linux-x64-GTK3.tgz"),
        ]
        .into_iter()
        .map(|(name, file)| (name.to_string(), zip_bytes(&[(file, "payload")])))
        .collect();

        FakeGithub { listing, archives }
    }

    #[test]
    fn prepare_renders_names_and_release_dir() {
        let root = TempDir::new().unwrap();
        write_version(root.path());

        let plan = prepare(&config_in(root.path()), "240110").unwrap();

        assert_eq!(plan.version, "2.5.59");
        assert_eq!(plan.release_dir, root.path().join("build").join("release_2.5.59"));
        assert_eq!(plan.specs[1].name, "rc_SuperSlicer-linux-x64-GTK3.tgz");
        assert_eq!(plan.options.rc_branch, "rc");
        assert_eq!(plan.compressor, Compressor::Builtin);
    }

    #[test]
    fn prepare_warns_about_unversioned_outputs() {
        let root = TempDir::new().unwrap();
        write_version(root.path());
        let mut config = config_in(root.path());
        config.collect.artifacts.truncate(1);
        config.collect.artifacts[0].package = PackageAction::Compress {
            dir: "{{program}}_win64".to_string(),
        };

        let plan = prepare(&config, "240110").unwrap();
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("rc_win64"));

        let defaults = prepare(&config_in(root.path()), "240110").unwrap();
        assert!(defaults.warnings.is_empty());
    }

    #[test]
    fn prepare_rejects_missing_version() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("version.inc"), "set(SLIC3R_VERSION \"2.5\")\n").unwrap();

        let err = prepare(&config_in(root.path()), "240110").unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
    }

    #[test]
    fn prepare_rejects_names_that_collide_after_rendering() {
        let root = TempDir::new().unwrap();
        write_version(root.path());
        let mut config = config_in(root.path());
        let mut literal = config
            .collect
            .artifacts
            .iter()
            .find(|spec| spec.name == "rc_{{program}}-macOS.dmg")
            .cloned()
            .unwrap();
        literal.name = "rc_SuperSlicer-macOS.dmg".to_string();
        config.collect.artifacts.push(literal);

        let err = prepare(&config, "240110").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "collect.artifacts");
        assert_eq!(err.details["value"], "rc_SuperSlicer-macOS.dmg");
    }

    #[test]
    fn execute_packages_all_six_artifacts() {
        let root = TempDir::new().unwrap();
        write_version(root.path());
        let plan = prepare(&config_in(root.path()), "240110").unwrap();
        let source = full_release();

        let report = execute(&plan, &source).unwrap();

        assert_eq!(report.scan.stop_reason, StopReason::AllFound);
        assert_eq!(report.scan.pages_fetched, 2);
        assert_eq!(report.artifacts.len(), 6);
        assert!(report.artifacts.iter().all(|a| a.packaged));
        assert!(report.warnings.is_empty());

        let release = &plan.release_dir;
        for file in [
            "SuperSlicer_2.5.59_win64_240110.zip",
            "SuperSlicer_2.5.59_macos_240110.dmg",
            "SuperSlicer_2.5.59_macos_arm_240110.dmg",
            "SuperSlicer-ubuntu_22.04-gtk2-2.5.59.AppImage",
            "SuperSlicer-ubuntu_22.04-2.5.59.AppImage",
            "SuperSlicer_2.5.59_linux64_240110.tgz",
        ] {
            assert!(release.join(file).is_file(), "missing {}", file);
        }
        assert!(release
            .join("SuperSlicer_2.5.59_win64_240110")
            .join("superslicer.exe")
            .is_file());
    }

    #[test]
    fn execute_clears_previous_release_dir() {
        let root = TempDir::new().unwrap();
        write_version(root.path());
        let plan = prepare(&config_in(root.path()), "240110").unwrap();
        fs::create_dir_all(&plan.release_dir).unwrap();
        fs::write(plan.release_dir.join("leftover.dmg"), "old").unwrap();

        let source = FakeGithub {
            listing: PagedSource::new(vec![]),
            archives: HashMap::new(),
        };
        let report = execute(&plan, &source).unwrap();

        assert!(report.cleaned_previous);
        assert!(!plan.release_dir.join("leftover.dmg").exists());
        assert_eq!(report.scan.stop_reason, StopReason::Exhausted);
        assert_eq!(report.scan.missing.len(), 6);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.starts_with("Not found for this release")));
    }

    #[test]
    fn download_failure_aborts_run() {
        let root = TempDir::new().unwrap();
        write_version(root.path());
        let plan = prepare(&config_in(root.path()), "240110").unwrap();

        let source = FakeGithub {
            listing: PagedSource::new(vec![vec![artifact("rc_win64", "2024-01-10", "rc")]]),
            archives: HashMap::new(),
        };

        let err = execute(&plan, &source).unwrap_err();
        assert_eq!(err.code.as_str(), "remote.status_error");
    }

    #[test]
    fn report_serializes_flattened_scan_fields() {
        let root = TempDir::new().unwrap();
        write_version(root.path());
        let plan = prepare(&config_in(root.path()), "240110").unwrap();

        let report = execute(&plan, &full_release()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["stop_reason"], "all_found");
        assert_eq!(json["first_day"], "2024-01-10");
        assert_eq!(json["version"], "2.5.59");
        assert!(json.get("warnings").is_none());
    }
}
