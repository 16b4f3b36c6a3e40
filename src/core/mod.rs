//! Core data structures.
//!
//! - Host platform, architecture and RID naming
//! - Build requests and output layouts
//! - Build and package manifests
//! - Pipeline errors

pub mod errors;
pub mod layout;
pub mod manifest;
pub mod platform;
pub mod request;

pub use errors::NativeError;
pub use layout::{ArtifactLayout, Library, StagingLayout};
pub use manifest::{BuildManifest, PackageManifest};
pub use platform::{Arch, Configuration, Platform, Rid};
pub use request::BuildRequest;
