//! Provenance manifests.
//!
//! Two JSON sidecars are written, both overwritten wholesale on every run:
//!
//! - the per-build manifest next to `<artifacts>/<library>/<rid>/native`
//! - the packaging manifest next to the produced `.nupkg` files

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::core::layout::Library;
use crate::core::platform::{Configuration, Rid};
use crate::util::fs::write_string;

/// Metadata for one `(library, rid, configuration)` build.
///
/// Serialized as `{rid, configuration, artifacts, <library>_commit}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildManifest {
    pub library: Library,
    pub rid: Rid,
    pub configuration: Configuration,
    /// File names of the staged artifacts, in staging order.
    pub artifacts: Vec<String>,
    pub commit: String,
}

impl BuildManifest {
    /// Key holding the source revision, e.g. `rive_commit`.
    pub fn commit_key(&self) -> String {
        format!("{}_commit", self.library.manifest_key())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

impl Serialize for BuildManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("rid", &self.rid)?;
        map.serialize_entry("configuration", self.configuration.as_str())?;
        map.serialize_entry("artifacts", &self.artifacts)?;
        map.serialize_entry(&self.commit_key(), &self.commit)?;
        map.end()
    }
}

/// One produced package file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub file: String,
    pub size_bytes: u64,
}

/// Staged files per RID, keyed by library (`{"impeller": [...]}`).
pub type NativeSummary = BTreeMap<Rid, BTreeMap<String, Vec<String>>>;

/// Consolidated manifest for one packaging run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Capitalized configuration (`Release`).
    pub configuration: String,
    /// Empty when no suffix was requested.
    pub version_suffix: String,
    pub rids: Vec<Rid>,
    /// Empty when the native check was skipped.
    pub native_artifacts: NativeSummary,
    pub packages: Vec<PackageEntry>,
    pub git_commit: String,
}

impl PackageManifest {
    pub fn write(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize manifest")?;
    write_string(path, &json)?;
    tracing::info!("Wrote manifest -> {}", path.display());
    Ok(())
}
