use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;

use rcpack::collect::{self, Compressor, StopReason};
use rcpack::defaults::{self, RcpackConfig};
use rcpack::github::{Artifact, ArtifactPage, ArtifactSource, WorkflowRun};
use rcpack::Result;
use tempfile::TempDir;

fn zip_of(file: &str, content: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file(file, zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn rc(name: &str, created_at: &str) -> Artifact {
    Artifact {
        name: name.to_string(),
        created_at: created_at.to_string(),
        archive_download_url: format!("https://example.invalid/{}/zip", name),
        workflow_run: Some(WorkflowRun {
            head_branch: Some("rc".to_string()),
        }),
    }
}

/// One listing page; records every download request.
struct SinglePage {
    artifacts: Vec<Artifact>,
    downloads: RefCell<Vec<String>>,
}

impl ArtifactSource for SinglePage {
    fn fetch_page(&self, page: u32) -> Result<ArtifactPage> {
        let artifacts = if page == 1 {
            self.artifacts.clone()
        } else {
            Vec::new()
        };
        Ok(ArtifactPage {
            total_count: self.artifacts.len() as u64,
            artifacts,
        })
    }

    fn download(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        self.downloads.borrow_mut().push(artifact.name.clone());
        Ok(zip_of("SuperSlicer-macOS-intel.dmg", "dmg"))
    }
}

fn config_file(root: &Path) -> std::path::PathBuf {
    fs::write(
        root.join("version.inc"),
        "set(SLIC3R_VERSION_FULL \"2.5.59\")\n",
    )
    .unwrap();

    let config = serde_json::json!({
        "collect": {
            "version_file": root.join("version.inc"),
            "build_dir": root.join("build"),
            "compress_tool": null,
            "artifacts": [
                {
                    "name": "rc_{{program}}-macOS.dmg",
                    "label": "macos-intel",
                    "package": {
                        "action": "rename",
                        "from": "{{program}}-macOS-intel.dmg",
                        "to": "{{program}}_{{version}}_macos_{{date}}.dmg"
                    }
                }
            ]
        }
    });
    let path = root.join("rcpack.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

#[test]
fn configured_table_drives_collection() {
    let root = TempDir::new().unwrap();
    let path = config_file(root.path());

    let loaded = defaults::load(Some(&path)).unwrap();
    let plan = collect::prepare(&loaded.config, "240110").unwrap();
    assert_eq!(plan.specs.len(), 1);
    assert_eq!(plan.compressor, Compressor::Builtin);

    let source = SinglePage {
        artifacts: vec![
            rc("rc_SuperSlicer-macOS.dmg", "2024-01-10T09:00:00Z"),
            rc("rc_SuperSlicer-macOS.dmg", "2024-01-10T08:00:00Z"),
        ],
        downloads: RefCell::new(Vec::new()),
    };

    let report = collect::execute(&plan, &source).unwrap();

    assert_eq!(report.scan.stop_reason, StopReason::AllFound);
    assert_eq!(source.downloads.borrow().len(), 1);
    assert!(plan
        .release_dir
        .join("SuperSlicer_2.5.59_macos_240110.dmg")
        .is_file());
}

#[test]
fn day_boundary_stops_before_older_artifacts() {
    let root = TempDir::new().unwrap();
    let path = config_file(root.path());

    let mut config: RcpackConfig = defaults::load(Some(&path)).unwrap().config;
    config.collect.artifacts.push(config.collect.artifacts[0].clone());
    config.collect.artifacts[1].name = "rc_win64".to_string();
    let plan = collect::prepare(&config, "240110").unwrap();

    let source = SinglePage {
        artifacts: vec![
            rc("rc_SuperSlicer-macOS.dmg", "2024-01-10T09:00:00Z"),
            rc("rc_win64", "2024-01-09T09:00:00Z"),
        ],
        downloads: RefCell::new(Vec::new()),
    };

    let report = collect::execute(&plan, &source).unwrap();

    assert_eq!(report.scan.stop_reason, StopReason::DayBoundary);
    assert_eq!(report.scan.missing, vec!["rc_win64".to_string()]);
    assert_eq!(*source.downloads.borrow(), vec!["rc_SuperSlicer-macOS.dmg".to_string()]);
}

#[test]
fn invalid_config_file_is_rejected() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("rcpack.json");
    fs::write(&path, "{ not json").unwrap();

    let err = defaults::load(Some(&path)).unwrap_err();
    assert_eq!(err.code.as_str(), "config.invalid_json");
}
