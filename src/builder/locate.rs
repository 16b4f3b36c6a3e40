//! Artifact discovery in build output directories.
//!
//! Neither GN nor CMake reports what it produced, so binaries are found by
//! file name. Patterns are grouped in tiers: the first tier that matches
//! anything wins, and later tiers are only consulted when every earlier one
//! came up empty. Shared and static results are never mixed.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::NativeError;
use crate::core::layout::Library;
use crate::core::platform::Platform;
use crate::util::fs::glob_files;

/// A group of glob patterns tried together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTier {
    pub patterns: Vec<String>,
}

impl PatternTier {
    pub fn new(patterns: &[&str]) -> Self {
        PatternTier {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Non-empty, sorted list of discovered binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    files: Vec<PathBuf>,
}

impl ArtifactSet {
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// File names, in set order.
    pub fn names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Ordered pattern tiers for one library on one platform.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    tiers: Vec<PatternTier>,
}

impl ArtifactLocator {
    pub fn new(tiers: Vec<PatternTier>) -> Self {
        ArtifactLocator { tiers }
    }

    /// Built-in patterns for `library` on `platform`.
    pub fn for_library(library: Library, platform: Platform) -> Self {
        let tiers = match (library, platform) {
            (Library::Impeller, Platform::Macos) => vec![
                PatternTier::new(&["libimpeller.dylib"]),
                PatternTier::new(&["libimpeller.a"]),
            ],
            (Library::Impeller, Platform::Linux) => vec![
                PatternTier::new(&["libimpeller.so"]),
                PatternTier::new(&["libimpeller.a"]),
            ],
            // The import library and debug symbols ship alongside the DLL.
            (Library::Impeller, Platform::Windows) => vec![PatternTier::new(&[
                "impeller.dll",
                "impeller.lib",
                "impeller.pdb",
            ])],
            (Library::Rive, Platform::Macos) => vec![
                PatternTier::new(&["librive_ffi*.dylib", "librive*.dylib"]),
                PatternTier::new(&["librive*.a"]),
            ],
            (Library::Rive, Platform::Linux) => vec![
                PatternTier::new(&["librive_ffi*.so", "librive*.so"]),
                PatternTier::new(&["librive*.a"]),
            ],
            (Library::Rive, Platform::Windows) => vec![
                PatternTier::new(&["rive_ffi*.dll", "rive*.dll"]),
                PatternTier::new(&["rive*.lib"]),
            ],
        };
        Self::new(tiers)
    }

    pub fn tiers(&self) -> &[PatternTier] {
        &self.tiers
    }

    /// Every pattern, across all tiers, in the order they are tried.
    pub fn patterns(&self) -> Vec<String> {
        self.tiers
            .iter()
            .flat_map(|t| t.patterns.iter().cloned())
            .collect()
    }

    /// Return the matches of the first tier that matches anything in `dir`.
    pub fn locate(&self, dir: &Path) -> Result<ArtifactSet> {
        for (index, tier) in self.tiers.iter().enumerate() {
            let files = glob_files(dir, &tier.patterns)?;
            if !files.is_empty() {
                if index > 0 {
                    tracing::warn!(
                        "no shared library found in {}; using fallback patterns {}",
                        dir.display(),
                        tier.patterns.join(", ")
                    );
                }
                for file in &files {
                    tracing::debug!("found artifact {}", file.display());
                }
                return Ok(ArtifactSet { files });
            }
        }

        Err(NativeError::NoArtifactsFound {
            dir: dir.to_path_buf(),
            patterns: self.patterns(),
        }
        .into())
    }
}
