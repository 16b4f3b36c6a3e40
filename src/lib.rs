//! impeller-build: native build and packaging pipeline for ImpellerSharp.
//!
//! Drives the Impeller engine (GN + Ninja) and Rive runtime (CMake) builds,
//! stages their binaries into the managed projects, packs the NuGet packages
//! and keeps the interop API coverage report current.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a scripted command runner and on-disk fixture writers.
#[cfg(test)]
pub mod test_support;

pub use self::core::{BuildRequest, Library, NativeError};
pub use util::context::GlobalContext;
