//! Pack the managed projects after checking native inputs.
//!
//! Every requested RID is checked before anything runs, and all gaps are
//! reported together so they can be fixed in one pass.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::{MissingArtifact, NativeError};
use crate::core::layout::{ArtifactLayout, Library};
use crate::core::manifest::{NativeSummary, PackageEntry, PackageManifest};
use crate::core::platform::{Configuration, Rid};
use crate::sources::git::revision_or_unknown;
use crate::util::fs::{ensure_dir, file_names, glob_files};
use crate::util::process::{run_checked, CommandRunner, ProcessBuilder, SearchPath};

/// RIDs checked when none are requested.
pub const DEFAULT_RIDS: &[&str] = &["osx-arm64", "linux-x64", "win-x64"];

/// Projects packed, in order.
pub const DEFAULT_PROJECTS: &[&str] = &[
    "src/ImpellerSharp.Native/ImpellerSharp.Native.csproj",
    "src/ImpellerSharp.Interop/ImpellerSharp.Interop.csproj",
    "src/ImpellerSharp.Avalonia/ImpellerSharp.Avalonia.csproj",
    "src/ImpellerSharp.Avalonia.Mac/ImpellerSharp.Avalonia.Mac.csproj",
    "src/ImpellerSharp.Avalonia.Windows/ImpellerSharp.Avalonia.Windows.csproj",
    "src/ImpellerSharp.Avalonia.Linux/ImpellerSharp.Avalonia.Linux.csproj",
];

pub const DEFAULT_SOLUTION: &str = "ImpellerSharp.sln";

/// Package destination, relative to the repository root.
pub const DEFAULT_OUTPUT: &str = "artifacts/nuget";

/// Options for a packaging run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Working directory for dotnet and source of the recorded revision
    pub repo_root: PathBuf,

    /// Engine artifact tree checked for staged binaries
    pub artifacts: ArtifactLayout,

    pub configuration: Configuration,

    /// Directory receiving `.nupkg` files and `manifest.json`
    pub output: PathBuf,

    pub rids: Vec<Rid>,

    /// Project files, relative to the repository root
    pub projects: Vec<PathBuf>,

    pub solution: PathBuf,

    /// Passed to `dotnet pack --version-suffix`
    pub version_suffix: Option<String>,

    pub skip_native_check: bool,
}

impl PackageOptions {
    /// Defaults for a repository rooted at `repo_root`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        PackageOptions {
            artifacts: ArtifactLayout::for_library(&repo_root.join("artifacts"), Library::Impeller),
            configuration: Configuration::Release,
            output: repo_root.join(DEFAULT_OUTPUT),
            rids: DEFAULT_RIDS.iter().map(|r| Rid::new(*r)).collect(),
            projects: DEFAULT_PROJECTS.iter().map(PathBuf::from).collect(),
            solution: PathBuf::from(DEFAULT_SOLUTION),
            version_suffix: None,
            skip_native_check: false,
            repo_root,
        }
    }
}

/// Reject suffixes that are not a valid SemVer pre-release.
pub fn validate_version_suffix(suffix: &str) -> Result<(), NativeError> {
    if suffix.is_empty() {
        return Err(NativeError::InvalidVersionSuffix {
            suffix: suffix.to_string(),
            reason: "suffix is empty".to_string(),
        });
    }
    semver::Prerelease::new(suffix)
        .map(|_| ())
        .map_err(|e| NativeError::InvalidVersionSuffix {
            suffix: suffix.to_string(),
            reason: e.to_string(),
        })
}

/// Check every RID has staged engine binaries.
///
/// Returns the staged file names per RID, or one error naming every gap.
pub fn check_native_artifacts(layout: &ArtifactLayout, rids: &[Rid]) -> Result<NativeSummary> {
    let mut summary = NativeSummary::new();
    let mut missing = Vec::new();

    for rid in rids {
        let native = layout.native_dir(rid);
        let files = file_names(&native)?;
        if files.is_empty() {
            missing.push(MissingArtifact {
                library: Library::Impeller.display_name().to_string(),
                rid: rid.clone(),
                path: native,
            });
        } else {
            summary.insert(
                rid.clone(),
                BTreeMap::from([(Library::Impeller.manifest_key().to_string(), files)]),
            );
        }
    }

    if !missing.is_empty() {
        return Err(NativeError::NativeArtifactsMissing { missing }.into());
    }
    Ok(summary)
}

/// Remove packages left by a previous run and make sure `output` exists.
pub fn clean_output(output: &Path) -> Result<()> {
    for pkg in glob_files(output, &["*.nupkg".to_string()])? {
        std::fs::remove_file(&pkg)
            .with_context(|| format!("failed to remove {}", pkg.display()))?;
    }
    ensure_dir(output)
}

/// Produced packages, sorted by name.
pub fn collect_packages(output: &Path) -> Result<Vec<PackageEntry>> {
    glob_files(output, &["*.nupkg".to_string()])?
        .into_iter()
        .map(|path| {
            let size_bytes = std::fs::metadata(&path)
                .with_context(|| format!("failed to read metadata: {}", path.display()))?
                .len();
            Ok(PackageEntry {
                file: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                size_bytes,
            })
        })
        .collect()
}

/// Check inputs, pack every project, and write `<output>/manifest.json`.
pub fn package(
    runner: &dyn CommandRunner,
    search: &SearchPath,
    opts: &PackageOptions,
) -> Result<PackageManifest> {
    if let Some(ref suffix) = opts.version_suffix {
        validate_version_suffix(suffix)?;
    }

    let native_artifacts = if opts.skip_native_check {
        tracing::warn!("Skipping native artifact check");
        NativeSummary::new()
    } else {
        check_native_artifacts(&opts.artifacts, &opts.rids)?
    };

    let dotnet = search.which("dotnet").ok_or_else(|| NativeError::GeneratorToolMissing {
        tool: "dotnet".to_string(),
        hint: Some("Install the .NET SDK (8.0 or newer)".to_string()),
    })?;

    clean_output(&opts.output)?;

    let restore = ProcessBuilder::new(&dotnet)
        .arg("restore")
        .arg(&opts.solution)
        .cwd(&opts.repo_root)
        .search_path(search)?;
    run_checked(runner, &restore)?;

    let configuration = opts.configuration.capitalized();
    for project in &opts.projects {
        let mut pack = ProcessBuilder::new(&dotnet)
            .arg("pack")
            .arg(project)
            .args(["-c", configuration, "-o"])
            .arg(&opts.output)
            .arg("--no-restore");
        if let Some(ref suffix) = opts.version_suffix {
            pack = pack.arg("--version-suffix").arg(suffix);
        }
        run_checked(runner, &pack.cwd(&opts.repo_root).search_path(search)?)?;
    }

    let manifest = PackageManifest {
        configuration: configuration.to_string(),
        version_suffix: opts.version_suffix.clone().unwrap_or_default(),
        rids: opts.rids.clone(),
        native_artifacts,
        packages: collect_packages(&opts.output)?,
        git_commit: revision_or_unknown(&opts.repo_root),
    };
    manifest.write(&opts.output.join("manifest.json"))?;

    tracing::info!(
        "Completed packaging. Packages available under {}",
        opts.output.display()
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{stage_rid, MockExecutor};
    use tempfile::TempDir;

    fn rids(values: &[&str]) -> Vec<Rid> {
        values.iter().map(|r| Rid::new(*r)).collect()
    }

    #[test]
    fn test_missing_rids_are_aggregated() {
        let tmp = TempDir::new().unwrap();
        let artifacts = tmp.path().join("artifacts");
        stage_rid(&artifacts, "native", "osx-arm64", &["libimpeller.dylib"]);
        // An empty native/ folder counts as missing.
        std::fs::create_dir_all(artifacts.join("native/win-x64/native")).unwrap();

        let layout = ArtifactLayout::for_library(&artifacts, Library::Impeller);
        let err = check_native_artifacts(&layout, &rids(&["osx-arm64", "linux-x64", "win-x64", "linux-arm64"]))
            .unwrap_err();

        match err.downcast_ref::<NativeError>() {
            Some(NativeError::NativeArtifactsMissing { missing }) => {
                let named: Vec<&str> = missing.iter().map(|m| m.rid.as_str()).collect();
                assert_eq!(named, vec!["linux-x64", "win-x64", "linux-arm64"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("Impeller artifacts missing for linux-x64 under "));
    }

    #[test]
    fn test_native_summary() {
        let tmp = TempDir::new().unwrap();
        let artifacts = tmp.path().join("artifacts");
        stage_rid(&artifacts, "native", "win-x64", &["impeller.pdb", "impeller.dll"]);

        let summary = check_native_artifacts(
            &ArtifactLayout::for_library(&artifacts, Library::Impeller),
            &rids(&["win-x64"]),
        )
        .unwrap();
        assert_eq!(
            summary[&Rid::new("win-x64")]["impeller"],
            vec!["impeller.dll", "impeller.pdb"]
        );
    }

    #[test]
    fn test_gap_stops_before_packing() {
        let tmp = TempDir::new().unwrap();
        stage_rid(&tmp.path().join("artifacts"), "native", "osx-arm64", &["libimpeller.dylib"]);

        let mut opts = PackageOptions::new(tmp.path());
        opts.rids = rids(&["osx-arm64", "linux-x64"]);

        let exec = MockExecutor::new();
        let err = package(&exec, &SearchPath::isolated(Vec::new()), &opts).unwrap_err();
        assert!(err.to_string().contains("linux-x64"));
        assert!(!err.to_string().contains("osx-arm64"));
        assert!(exec.calls().is_empty());
        assert!(!opts.output.exists());
    }

    #[test]
    fn test_version_suffix_validation() {
        assert!(validate_version_suffix("preview.1").is_ok());
        assert!(validate_version_suffix("ci-20240101").is_ok());
        assert!(validate_version_suffix("").is_err());
        assert!(validate_version_suffix("beta..1").is_err());
        assert!(validate_version_suffix("bad suffix").is_err());
    }

    #[test]
    fn test_clean_output_only_removes_packages() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Old.1.0.0.nupkg"), "x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        clean_output(tmp.path()).unwrap();
        assert!(!tmp.path().join("Old.1.0.0.nupkg").exists());
        assert!(tmp.path().join("notes.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_package_sequence_and_manifest() {
        use crate::test_support::{fake_tools, write_file};

        let tmp = TempDir::new().unwrap();
        let bin = fake_tools(&tmp.path().join("bin"), &["dotnet"]);
        stage_rid(&tmp.path().join("artifacts"), "native", "linux-x64", &["libimpeller.so"]);
        write_file(&tmp.path().join("artifacts/nuget/Stale.0.1.0.nupkg"), "old");

        let mut opts = PackageOptions::new(tmp.path());
        opts.rids = rids(&["linux-x64"]);
        opts.projects = vec![PathBuf::from("src/A/A.csproj"), PathBuf::from("src/B/B.csproj")];
        opts.version_suffix = Some("preview.2".to_string());

        let exec = MockExecutor::permissive();
        let manifest = package(&exec, &SearchPath::isolated(vec![bin]), &opts).unwrap();

        let calls = exec.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].ends_with("restore ImpellerSharp.sln"));
        assert!(calls[1].contains("pack src/A/A.csproj -c Release -o "));
        assert!(calls[1].ends_with("--no-restore --version-suffix preview.2"));
        assert!(calls[2].contains("pack src/B/B.csproj"));

        assert!(manifest.packages.is_empty());
        assert_eq!(manifest.version_suffix, "preview.2");
        assert_eq!(manifest.configuration, "Release");
        assert_eq!(manifest.git_commit, "unknown");
        assert!(!opts.output.join("Stale.0.1.0.nupkg").exists());
        assert!(opts.output.join("manifest.json").is_file());
    }

    #[test]
    fn test_collect_packages() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("B.1.0.0.nupkg"), "bb").unwrap();
        std::fs::write(tmp.path().join("A.1.0.0.nupkg"), "a").unwrap();

        let packages = collect_packages(tmp.path()).unwrap();
        assert_eq!(
            packages,
            vec![
                PackageEntry { file: "A.1.0.0.nupkg".to_string(), size_bytes: 1 },
                PackageEntry { file: "B.1.0.0.nupkg".to_string(), size_bytes: 2 },
            ]
        );
    }
}
