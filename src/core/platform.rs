//! Platform resolution.
//!
//! Normalizes the free-form `--platform`, `--arch` and `--configuration`
//! inputs into canonical values and derives the runtime identifier (RID)
//! that keys every artifact and staging path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::NativeError;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Macos,
    Linux,
    Windows,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 3] = [Platform::Macos, Platform::Linux, Platform::Windows];

    /// Name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Macos => "macos",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }

    /// Prefix used when building the runtime identifier.
    pub fn rid_prefix(&self) -> &'static str {
        match self {
            Platform::Macos => "osx",
            Platform::Linux => "linux",
            Platform::Windows => "win",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = NativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "macos" => Ok(Platform::Macos),
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(NativeError::UnsupportedPlatform {
                platform: other.to_string(),
            }),
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    /// All supported architectures.
    pub const ALL: [Arch; 2] = [Arch::X64, Arch::Arm64];

    /// Canonical name, as used by GN and in RIDs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }

    /// Architecture reported by the host machine.
    pub fn host() -> Result<Arch, NativeError> {
        normalize_arch(std::env::consts::ARCH)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = NativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_arch(s)
    }
}

/// Normalize an architecture alias to its canonical form.
///
/// Matching is case-insensitive. `x86_64`/`amd64`/`x64` map to [`Arch::X64`],
/// `aarch64`/`arm64` map to [`Arch::Arm64`]; anything else is rejected.
pub fn normalize_arch(value: &str) -> Result<Arch, NativeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" => Ok(Arch::X64),
        "aarch64" | "arm64" => Ok(Arch::Arm64),
        _ => Err(NativeError::UnsupportedArchitecture {
            arch: value.to_string(),
        }),
    }
}

/// Resolve an optional architecture argument, falling back to the host.
pub fn resolve_arch(value: Option<&str>) -> Result<Arch, NativeError> {
    match value {
        Some(v) if !v.trim().is_empty() => normalize_arch(v),
        _ => Arch::host(),
    }
}

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    Debug,
    #[default]
    Release,
}

impl Configuration {
    /// Lowercase name (`debug`, `release`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::Release => "release",
        }
    }

    /// Capitalized name used by CMake and MSBuild (`Debug`, `Release`).
    pub fn capitalized(&self) -> &'static str {
        match self {
            Configuration::Debug => "Debug",
            Configuration::Release => "Release",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = NativeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Configuration::Debug),
            "release" => Ok(Configuration::Release),
            _ => Err(NativeError::UnsupportedConfiguration {
                configuration: s.to_string(),
            }),
        }
    }
}

/// Runtime identifier, e.g. `osx-arm64`.
///
/// This is the only key shared between build output, the artifact tree and
/// the managed staging folders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rid(String);

impl Rid {
    /// Wrap an already-formed identifier (e.g. from `--rid`).
    pub fn new(value: impl Into<String>) -> Self {
        Rid(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Rid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the runtime identifier for a platform/architecture pair.
pub fn rid_for(platform: Platform, arch: Arch) -> Rid {
    Rid(format!("{}-{}", platform.rid_prefix(), arch.as_str()))
}
