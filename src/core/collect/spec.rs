//! Declarative table of expected release-candidate artifacts.
//!
//! Each entry says which artifact name to look for, where its zip is unpacked,
//! and what is done with the unpacked files afterwards. Strings are templates
//! over `{{program}}`, `{{version}}` and `{{date}}`.

use serde::{Deserialize, Serialize};

use crate::template::{self, TemplateVars};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Artifact name as reported by the listing API.
    pub name: String,
    /// Short human label used in logs and reports.
    pub label: String,
    #[serde(default)]
    pub unpack: UnpackTarget,
    #[serde(default)]
    pub package: PackageAction,
}

/// Where the downloaded zip is unpacked, relative to the release directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "into", rename_all = "snake_case")]
pub enum UnpackTarget {
    #[default]
    ReleaseDir,
    Subdir { dir: String },
}

/// What happens to the unpacked files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PackageAction {
    #[default]
    None,
    /// Zip the directory `dir` into `<dir>.zip`.
    Compress { dir: String },
    /// Rename the unpacked file `from` to `to`.
    Rename { from: String, to: String },
}

/// Values substituted into spec templates.
#[derive(Debug, Clone)]
pub struct NamingVars {
    pub program: String,
    pub version: String,
    pub date: String,
}

impl NamingVars {
    fn render(&self, text: &str) -> String {
        template::render(
            text,
            &[
                (TemplateVars::PROGRAM, self.program.as_str()),
                (TemplateVars::VERSION, self.version.as_str()),
                (TemplateVars::DATE, self.date.as_str()),
            ],
        )
    }
}

impl ArtifactSpec {
    pub fn new(name: &str, label: &str, unpack: UnpackTarget, package: PackageAction) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            unpack,
            package,
        }
    }

    /// Substitute naming variables into every template field.
    pub fn render(&self, vars: &NamingVars) -> ArtifactSpec {
        let unpack = match &self.unpack {
            UnpackTarget::ReleaseDir => UnpackTarget::ReleaseDir,
            UnpackTarget::Subdir { dir } => UnpackTarget::Subdir {
                dir: vars.render(dir),
            },
        };

        let package = match &self.package {
            PackageAction::None => PackageAction::None,
            PackageAction::Compress { dir } => PackageAction::Compress {
                dir: vars.render(dir),
            },
            PackageAction::Rename { from, to } => PackageAction::Rename {
                from: vars.render(from),
                to: vars.render(to),
            },
        };

        ArtifactSpec {
            name: vars.render(&self.name),
            label: self.label.clone(),
            unpack,
            package,
        }
    }

    /// Name of the file this spec produces, when it renames or compresses.
    pub fn output_name(&self) -> Option<String> {
        match &self.package {
            PackageAction::None => None,
            PackageAction::Compress { dir } => Some(format!("{}.zip", dir)),
            PackageAction::Rename { to, .. } => Some(to.clone()),
        }
    }

    /// Output templates that do not embed the version collide across releases.
    pub fn lacks_version(&self) -> bool {
        let target = match &self.package {
            PackageAction::None => return false,
            PackageAction::Compress { dir } => dir,
            PackageAction::Rename { to, .. } => to,
        };
        !template::is_present(target, TemplateVars::VERSION)
    }
}

/// Render a whole table, keeping its order.
pub fn render_all(specs: &[ArtifactSpec], vars: &NamingVars) -> Vec<ArtifactSpec> {
    specs.iter().map(|spec| spec.render(vars)).collect()
}

/// The six artifacts a release-candidate build publishes.
pub fn default_artifacts() -> Vec<ArtifactSpec> {
    vec![
        ArtifactSpec::new(
            "rc_win64",
            "win64",
            UnpackTarget::Subdir {
                dir: "{{program}}_{{version}}_win64_{{date}}".to_string(),
            },
            PackageAction::Compress {
                dir: "{{program}}_{{version}}_win64_{{date}}".to_string(),
            },
        ),
        ArtifactSpec::new(
            "rc_{{program}}-linux-x64-GTK3.tgz",
            "linux-gtk3-archive",
            UnpackTarget::ReleaseDir,
            PackageAction::Rename {
                from: "{{program}}-linux-x64-GTK3.tgz".to_string(),
                to: "{{program}}_{{version}}_linux64_{{date}}.tgz".to_string(),
            },
        ),
        ArtifactSpec::new(
            "rc_{{program}}-linux-x64-GTK2.AppImage",
            "linux-gtk2-appimage",
            UnpackTarget::ReleaseDir,
            PackageAction::Rename {
                from: "{{program}}-linux-x64-GTK2.AppImage".to_string(),
                to: "{{program}}-ubuntu_22.04-gtk2-{{version}}.AppImage".to_string(),
            },
        ),
        ArtifactSpec::new(
            "rc_{{program}}-linux-x64-GTK3.AppImage",
            "linux-gtk3-appimage",
            UnpackTarget::ReleaseDir,
            PackageAction::Rename {
                from: "{{program}}-linux-x64-GTK3.AppImage".to_string(),
                to: "{{program}}-ubuntu_22.04-{{version}}.AppImage".to_string(),
            },
        ),
        ArtifactSpec::new(
            "rc_{{program}}-macOS.dmg",
            "macos-intel",
            UnpackTarget::ReleaseDir,
            PackageAction::Rename {
                from: "{{program}}-macOS-intel.dmg".to_string(),
                to: "{{program}}_{{version}}_macos_{{date}}.dmg".to_string(),
            },
        ),
        ArtifactSpec::new(
            "rc_{{program}}-macOS-arm.dmg",
            "macos-arm",
            UnpackTarget::ReleaseDir,
            PackageAction::Rename {
                from: "{{program}}-macOS-arm.dmg".to_string(),
                to: "{{program}}_{{version}}_macos_arm_{{date}}.dmg".to_string(),
            },
        ),
    ]
}
