//! Build requests.

use crate::core::errors::NativeError;
use crate::core::platform::{rid_for, resolve_arch, Arch, Configuration, Platform, Rid};

/// One `(platform, arch, configuration)` build, fixed for the whole run.
///
/// Every platform/arch combination is accepted; whether the host toolchain
/// can actually cross-compile is left to the toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub platform: Platform,
    pub arch: Arch,
    pub configuration: Configuration,
    /// Skip dependency hydration (`gclient sync` / submodule init).
    pub skip_sync: bool,
}

impl BuildRequest {
    pub fn new(platform: Platform, arch: Arch, configuration: Configuration) -> Self {
        BuildRequest {
            platform,
            arch,
            configuration,
            skip_sync: false,
        }
    }

    /// Resolve raw command-line values.
    ///
    /// A missing or empty `arch` falls back to the host machine.
    pub fn parse(
        platform: &str,
        arch: Option<&str>,
        configuration: &str,
        skip_sync: bool,
    ) -> Result<Self, NativeError> {
        Ok(BuildRequest {
            platform: platform.parse()?,
            arch: resolve_arch(arch)?,
            configuration: configuration.parse()?,
            skip_sync,
        })
    }

    pub fn with_skip_sync(mut self, skip_sync: bool) -> Self {
        self.skip_sync = skip_sync;
        self
    }

    pub fn rid(&self) -> Rid {
        rid_for(self.platform, self.arch)
    }
}
