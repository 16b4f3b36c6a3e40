//! Native build orchestration.
//!
//! Each native library is driven by an orchestrator that turns a
//! [`BuildRequest`](crate::core::request::BuildRequest) into a populated
//! build output directory: GN + Ninja for the engine, CMake + Ninja for the
//! runtime. [`locate`] then finds the produced binaries in that directory.

pub mod cmake;
pub mod context;
pub mod gn;
pub mod locate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::layout::Library;

pub use cmake::RuntimeBuilder;
pub use context::BuildContext;
pub use gn::EngineBuilder;
pub use locate::{ArtifactLocator, ArtifactSet, PatternTier};

/// A toolchain-specific build of one native library.
pub trait NativeBuilder {
    /// Library this orchestrator produces.
    fn library(&self) -> Library;

    /// Source checkout being built (its revision goes into the manifest).
    fn checkout(&self) -> &Path;

    /// Run every build step and return the output directory.
    ///
    /// The first failing step aborts the build.
    fn build(&self) -> Result<PathBuf>;
}
