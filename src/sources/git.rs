//! Source-control metadata for checkouts.
//!
//! Only two facts are ever needed: the commit a checkout is at (recorded in
//! manifests) and the URL of its `origin` remote (used to bootstrap
//! `.gclient`). Both are read in-process through `git2`.

use std::path::Path;

use anyhow::{Context, Result};
use git2::Repository;

/// Recorded when the revision cannot be determined.
pub const UNKNOWN_REVISION: &str = "unknown";

/// Full commit id of `HEAD` for the repository rooted at `path`.
///
/// Parent directories are not searched, so a checkout that is not itself a
/// repository never reports the revision of an enclosing one.
pub fn head_revision(path: &Path) -> Result<String> {
    let repo = Repository::open(path)
        .with_context(|| format!("failed to open git repository at {}", path.display()))?;
    let commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .context("failed to resolve HEAD")?;
    Ok(commit.id().to_string())
}

/// Like [`head_revision`], but never fails.
pub fn revision_or_unknown(path: &Path) -> String {
    match head_revision(path) {
        Ok(rev) => rev,
        Err(e) => {
            tracing::warn!("could not determine revision of {}: {:#}", path.display(), e);
            UNKNOWN_REVISION.to_string()
        }
    }
}

/// URL of the `origin` remote, if the checkout has one.
pub fn origin_url(path: &Path) -> Option<String> {
    let repo = Repository::open(path).ok()?;
    let remote = repo.find_remote("origin").ok()?;
    remote.url().map(str::to_string)
}
