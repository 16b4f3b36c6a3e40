//! On-disk layout conventions.
//!
//! These paths are consumed by the managed projects and the packaging step,
//! so they must not drift:
//!
//! ```text
//! <artifacts>/<library>/<rid>/native/<binaries>
//! <artifacts>/<library>/<rid>/manifest.json
//! <project>/bin/<Configuration>/<framework>/runtimes/<rid>/native/<binaries>
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::platform::{Configuration, Rid};

/// Managed projects that receive staged runtime binaries.
pub const DEFAULT_STAGING_PROJECTS: &[&str] = &["src/ImpellerSharp.Native", "src/ImpellerSharp.Interop"];

/// Target framework folder under `bin/<Configuration>/`.
pub const DEFAULT_FRAMEWORK: &str = "net8.0";

/// Default artifact directory, relative to the repository root.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// A native library built by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Library {
    /// The Impeller graphics engine, built from the Flutter engine checkout.
    Impeller,
    /// The Rive vector-animation runtime.
    Rive,
}

impl Library {
    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Library::Impeller => "Impeller",
            Library::Rive => "Rive",
        }
    }

    /// Directory name under `<artifacts>/`.
    pub fn artifact_dir_name(&self) -> &'static str {
        match self {
            Library::Impeller => "native",
            Library::Rive => "rive",
        }
    }

    /// Key used for this library in manifests.
    pub fn manifest_key(&self) -> &'static str {
        match self {
            Library::Impeller => "impeller",
            Library::Rive => "rive",
        }
    }

    /// Default checkout location relative to the repository root.
    pub fn default_checkout(&self) -> &'static str {
        match self {
            Library::Impeller => "extern/flutter",
            Library::Rive => "extern/rive",
        }
    }

    /// Projects that receive this library's binaries when nothing is configured.
    pub fn default_staging_projects(&self) -> &'static [&'static str] {
        match self {
            Library::Impeller => &DEFAULT_STAGING_PROJECTS[..1],
            Library::Rive => DEFAULT_STAGING_PROJECTS,
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

impl FromStr for Library {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "impeller" => Ok(Library::Impeller),
            "rive" => Ok(Library::Rive),
            _ => Err(format!("unknown library '{}'; expected 'impeller' or 'rive'", s)),
        }
    }
}

/// Artifact tree for one library: `<root>/<rid>/native`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    /// Layout rooted at an explicit library directory (e.g. `--output`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ArtifactLayout { root: root.into() }
    }

    /// Layout for `library` under the shared artifacts directory.
    pub fn for_library(artifacts_dir: &Path, library: Library) -> Self {
        Self::new(artifacts_dir.join(library.artifact_dir_name()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rid_dir(&self, rid: &Rid) -> PathBuf {
        self.root.join(rid.as_str())
    }

    /// Directory holding the binaries for `rid`.
    pub fn native_dir(&self, rid: &Rid) -> PathBuf {
        self.rid_dir(rid).join("native")
    }

    /// Per-build manifest, next to the `native/` folder it describes.
    pub fn manifest_path(&self, rid: &Rid) -> PathBuf {
        self.rid_dir(rid).join("manifest.json")
    }
}

/// Runtime folders inside managed project output trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    projects: Vec<PathBuf>,
    framework: String,
}

impl StagingLayout {
    pub fn new(projects: Vec<PathBuf>, framework: impl Into<String>) -> Self {
        StagingLayout {
            projects,
            framework: framework.into(),
        }
    }

    pub fn projects(&self) -> &[PathBuf] {
        &self.projects
    }

    /// `<project>/bin/<Configuration>/<framework>/runtimes/<rid>/native`
    pub fn runtime_dir(&self, project: &Path, configuration: Configuration, rid: &Rid) -> PathBuf {
        project
            .join("bin")
            .join(configuration.capitalized())
            .join(&self.framework)
            .join("runtimes")
            .join(rid.as_str())
            .join("native")
    }

    /// Runtime folder in every project, in project order.
    pub fn destinations(&self, configuration: Configuration, rid: &Rid) -> Vec<PathBuf> {
        self.projects
            .iter()
            .map(|p| self.runtime_dir(p, configuration, rid))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_layout() {
        let layout = ArtifactLayout::for_library(Path::new("artifacts"), Library::Rive);
        let rid = Rid::new("osx-arm64");
        assert_eq!(layout.native_dir(&rid), PathBuf::from("artifacts/rive/osx-arm64/native"));
        assert_eq!(
            layout.manifest_path(&rid),
            PathBuf::from("artifacts/rive/osx-arm64/manifest.json")
        );

        let impeller = ArtifactLayout::for_library(Path::new("artifacts"), Library::Impeller);
        assert_eq!(impeller.root(), Path::new("artifacts/native"));
    }

    fn defaults(library: Library) -> StagingLayout {
        let projects = library
            .default_staging_projects()
            .iter()
            .map(|p| Path::new("/repo").join(p))
            .collect();
        StagingLayout::new(projects, DEFAULT_FRAMEWORK)
    }

    #[test]
    fn test_staging_layout() {
        let staging = defaults(Library::Rive);
        let dirs = staging.destinations(Configuration::Debug, &Rid::new("linux-x64"));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/repo/src/ImpellerSharp.Native/bin/Debug/net8.0/runtimes/linux-x64/native"),
                PathBuf::from("/repo/src/ImpellerSharp.Interop/bin/Debug/net8.0/runtimes/linux-x64/native"),
            ]
        );

        let impeller = defaults(Library::Impeller);
        assert_eq!(impeller.projects().len(), 1);
    }

    #[test]
    fn test_library_parse() {
        assert_eq!("Rive".parse::<Library>().unwrap(), Library::Rive);
        assert!("skia".parse::<Library>().is_err());
    }
}
