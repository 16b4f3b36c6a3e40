//! Build, locate, stage and record one native library.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::{ArtifactLocator, NativeBuilder};
use crate::core::errors::NativeError;
use crate::core::layout::{ArtifactLayout, StagingLayout};
use crate::core::manifest::BuildManifest;
use crate::core::request::BuildRequest;
use crate::ops::stage::stage_artifacts;
use crate::sources::git::revision_or_unknown;

/// Where a build's outputs should go.
#[derive(Debug, Clone)]
pub struct BuildNativeOptions {
    /// Artifact tree for the library (`<artifacts>/<library>`).
    pub artifacts: ArtifactLayout,
    /// Managed projects receiving a copy.
    pub staging: StagingLayout,
}

/// Result of a completed build.
#[derive(Debug, Clone)]
pub struct BuildNativeResult {
    /// `<artifacts>/<library>/<rid>/native`
    pub native_dir: PathBuf,
    /// Per-build manifest path.
    pub manifest_path: PathBuf,
    pub manifest: BuildManifest,
}

/// Run `builder`, then stage its binaries and write the manifest.
///
/// Nothing is staged and no manifest is written unless the build succeeds.
pub fn build_native(
    builder: &dyn NativeBuilder,
    request: &BuildRequest,
    opts: &BuildNativeOptions,
) -> Result<BuildNativeResult> {
    let library = builder.library();
    let rid = request.rid();

    let out_dir = builder.build()?;
    let artifacts = ArtifactLocator::for_library(library, request.platform).locate(&out_dir)?;

    let native_dir = opts.artifacts.native_dir(&rid);
    let mut destinations = vec![native_dir.clone()];
    destinations.extend(opts.staging.destinations(request.configuration, &rid));

    let copies = stage_artifacts(artifacts.files(), &destinations)?;
    if copies == 0 {
        return Err(NativeError::NoArtifactsStaged { root: out_dir }.into());
    }

    let manifest = BuildManifest {
        library,
        rid: rid.clone(),
        configuration: request.configuration,
        artifacts: artifacts.names(),
        commit: revision_or_unknown(builder.checkout()),
    };
    let manifest_path = opts.artifacts.manifest_path(&rid);
    manifest.write(&manifest_path)?;

    tracing::info!(
        "Completed {} build. Artifacts available under {}",
        library.display_name(),
        native_dir.display()
    );

    Ok(BuildNativeResult {
        native_dir,
        manifest_path,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::{Library, DEFAULT_FRAMEWORK};
    use crate::core::platform::{Arch, Configuration, Platform};
    use crate::test_support::{file_names, touch_files};
    use std::path::Path;
    use tempfile::TempDir;

    /// Builder that "produces" a fixed set of files.
    struct FakeBuilder {
        library: Library,
        checkout: PathBuf,
        out_dir: PathBuf,
        produce: Vec<&'static str>,
        fail: bool,
    }

    impl NativeBuilder for FakeBuilder {
        fn library(&self) -> Library {
            self.library
        }

        fn checkout(&self) -> &Path {
            &self.checkout
        }

        fn build(&self) -> Result<PathBuf> {
            if self.fail {
                return Err(NativeError::CommandFailed {
                    command: "ninja".to_string(),
                    code: 1,
                }
                .into());
            }
            touch_files(&self.out_dir, &self.produce);
            Ok(self.out_dir.clone())
        }
    }

    fn options(root: &Path, library: Library) -> BuildNativeOptions {
        BuildNativeOptions {
            artifacts: ArtifactLayout::for_library(&root.join("artifacts"), library),
            staging: StagingLayout::new(
                library
                    .default_staging_projects()
                    .iter()
                    .map(|p| root.join(p))
                    .collect(),
                DEFAULT_FRAMEWORK,
            ),
        }
    }

    #[test]
    fn test_build_stages_everywhere_and_writes_manifest() {
        let tmp = TempDir::new().unwrap();
        let builder = FakeBuilder {
            library: Library::Rive,
            checkout: tmp.path().join("extern/rive"),
            out_dir: tmp.path().join("extern/rive/out/linux-x64-release"),
            produce: vec!["librive_ffi.so", "librive.a"],
            fail: false,
        };
        let request = BuildRequest::new(Platform::Linux, Arch::X64, Configuration::Release);

        let result = build_native(&builder, &request, &options(tmp.path(), Library::Rive)).unwrap();

        assert_eq!(result.native_dir, tmp.path().join("artifacts/rive/linux-x64/native"));
        assert_eq!(file_names(&result.native_dir), vec!["librive_ffi.so"]);
        for project in ["ImpellerSharp.Native", "ImpellerSharp.Interop"] {
            let staged = tmp
                .path()
                .join("src")
                .join(project)
                .join("bin/Release/net8.0/runtimes/linux-x64/native");
            assert_eq!(file_names(&staged), vec!["librive_ffi.so"]);
        }

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&result.manifest_path).unwrap()).unwrap();
        assert_eq!(json["rid"], "linux-x64");
        assert_eq!(json["configuration"], "release");
        assert_eq!(json["artifacts"], serde_json::json!(["librive_ffi.so"]));
        assert_eq!(json["rive_commit"], "unknown");
    }

    #[test]
    fn test_failed_build_leaves_no_manifest() {
        let tmp = TempDir::new().unwrap();
        let builder = FakeBuilder {
            library: Library::Impeller,
            checkout: tmp.path().to_path_buf(),
            out_dir: tmp.path().join("out"),
            produce: Vec::new(),
            fail: true,
        };
        let request = BuildRequest::new(Platform::Macos, Arch::Arm64, Configuration::Debug);
        let opts = options(tmp.path(), Library::Impeller);

        assert!(build_native(&builder, &request, &opts).is_err());
        assert!(!opts.artifacts.manifest_path(&request.rid()).exists());
    }

    #[test]
    fn test_empty_output_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let builder = FakeBuilder {
            library: Library::Impeller,
            checkout: tmp.path().to_path_buf(),
            out_dir: tmp.path().join("out"),
            produce: vec!["args.gn"],
            fail: false,
        };
        let request = BuildRequest::new(Platform::Linux, Arch::X64, Configuration::Release);

        let err = build_native(&builder, &request, &options(tmp.path(), Library::Impeller)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NativeError>(),
            Some(NativeError::NoArtifactsFound { .. })
        ));
    }
}
