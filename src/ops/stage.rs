//! Copy native binaries into the artifact tree and managed project folders.
//!
//! Copies overwrite, so staging the same files twice leaves the same tree.
//! Concurrent runs targeting the same destination are not coordinated.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::NativeError;
use crate::core::layout::{ArtifactLayout, StagingLayout};
use crate::core::platform::{Configuration, Rid};
use crate::util::fs::{copy_preserving, ensure_dir, list_files};

/// Copy every artifact into every destination directory.
///
/// Returns the number of file copies made across all destinations.
pub fn stage_artifacts(artifacts: &[PathBuf], destinations: &[PathBuf]) -> Result<usize> {
    let mut copies = 0;

    for dest in destinations {
        ensure_dir(dest)?;
    }

    for source in artifacts {
        let Some(name) = source.file_name() else {
            continue;
        };
        for dest in destinations {
            let target = dest.join(name);
            copy_preserving(source, &target)?;
            tracing::debug!("Copied {} -> {}", name.to_string_lossy(), target.display());
            copies += 1;
        }
    }

    Ok(copies)
}

/// Outcome of re-staging an artifact tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSummary {
    /// RIDs that had a `native/` folder, in order.
    pub rids: Vec<Rid>,
    /// RID directories skipped because they have no `native/` folder.
    pub skipped: Vec<Rid>,
    /// Total file copies across all projects.
    pub copies: usize,
}

/// Stage `<root>/<rid>/native` for every RID present into the managed projects.
///
/// RIDs without a `native/` folder are skipped. Staging nothing at all is an
/// error, since it means the tree is empty or laid out differently.
pub fn stage_artifact_tree(
    layout: &ArtifactLayout,
    staging: &StagingLayout,
    configuration: Configuration,
) -> Result<StageSummary> {
    let root = layout.root();
    if !root.is_dir() {
        return Err(NativeError::InputMissing {
            what: "artifact tree".to_string(),
            path: root.to_path_buf(),
        }
        .into());
    }

    let mut summary = StageSummary::default();
    for rid in rid_dirs(root)? {
        let native = layout.native_dir(&rid);
        if !native.is_dir() {
            tracing::warn!("skipping {}: no native/ folder", rid);
            summary.skipped.push(rid);
            continue;
        }

        let files = list_files(&native)?;
        let copies = stage_artifacts(&files, &staging.destinations(configuration, &rid))?;
        tracing::info!("Staged {} file(s) for {}", files.len(), rid);
        summary.copies += copies;
        summary.rids.push(rid);
    }

    if summary.copies == 0 {
        return Err(NativeError::NoArtifactsStaged {
            root: root.to_path_buf(),
        }
        .into());
    }
    Ok(summary)
}

/// Sorted RID directory names under an artifact root.
fn rid_dirs(root: &Path) -> Result<Vec<Rid>> {
    let mut rids = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            rids.push(Rid::new(entry.file_name().to_string_lossy()));
        }
    }
    rids.sort();
    Ok(rids)
}
