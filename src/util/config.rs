//! Configuration file support.
//!
//! Two optional locations are read:
//! - Global: `<config dir>/impeller-build/config.toml` - user-wide defaults
//! - Project: `<repo>/.impeller/config.toml` - repository overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both. Every setting is optional; unset values
//! fall back to the built-in tables of the module that consumes them.
//!
//! ```toml
//! [paths]
//! flutter_root = "extern/flutter"
//! artifacts_dir = "artifacts"
//!
//! [staging]
//! projects = ["src/ImpellerSharp.Native"]
//! framework = "net8.0"
//!
//! [engine]
//! legacy_output_dir = false
//!
//! [package]
//! rids = ["osx-arm64", "linux-x64"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Project config directory name, relative to the repository root.
pub const PROJECT_CONFIG_DIR: &str = ".impeller";

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub staging: StagingConfig,
    pub engine: EngineConfig,
    pub package: PackageConfig,
    pub coverage: CoverageConfig,
    pub smoke: SmokeConfig,
}

/// Checkout and output locations. Relative paths resolve against the repo root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Flutter engine checkout (default `extern/flutter`)
    pub flutter_root: Option<PathBuf>,

    /// Rive runtime checkout (default `extern/rive`)
    pub rive_root: Option<PathBuf>,

    /// depot_tools checkout prepended to the search path (default `extern/depot_tools`)
    pub depot_tools: Option<PathBuf>,

    /// Artifact tree root (default `artifacts`)
    pub artifacts_dir: Option<PathBuf>,
}

/// Managed projects receiving staged binaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    pub projects: Option<Vec<PathBuf>>,
    pub framework: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Use the configuration-only `impeller_host_<mode>` output directory.
    pub legacy_output_dir: Option<bool>,

    /// Ninja targets to build
    pub ninja_targets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub rids: Option<Vec<String>>,
    pub projects: Option<Vec<PathBuf>>,
    pub solution: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub header: Option<PathBuf>,
    pub interop_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,

    /// Entry points without this prefix are not counted (default `Impeller`)
    pub symbol_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    pub symbols: Option<Vec<String>>,
}

/// Replace `base` when `over` is set.
fn overlay<T>(base: &mut Option<T>, over: Option<T>) {
    if over.is_some() {
        *base = over;
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        overlay(&mut self.paths.flutter_root, other.paths.flutter_root);
        overlay(&mut self.paths.rive_root, other.paths.rive_root);
        overlay(&mut self.paths.depot_tools, other.paths.depot_tools);
        overlay(&mut self.paths.artifacts_dir, other.paths.artifacts_dir);

        overlay(&mut self.staging.projects, other.staging.projects);
        overlay(&mut self.staging.framework, other.staging.framework);

        overlay(&mut self.engine.legacy_output_dir, other.engine.legacy_output_dir);
        overlay(&mut self.engine.ninja_targets, other.engine.ninja_targets);

        overlay(&mut self.package.rids, other.package.rids);
        overlay(&mut self.package.projects, other.package.projects);
        overlay(&mut self.package.solution, other.package.solution);
        overlay(&mut self.package.output, other.package.output);

        overlay(&mut self.coverage.header, other.coverage.header);
        overlay(&mut self.coverage.interop_dir, other.coverage.interop_dir);
        overlay(&mut self.coverage.output, other.coverage.output);
        overlay(&mut self.coverage.symbol_prefix, other.coverage.symbol_prefix);

        overlay(&mut self.smoke.symbols, other.smoke.symbols);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.impeller/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Global config path, e.g. `~/.config/impeller-build/config.toml` on Linux.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "impellersharp", "impeller-build")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Project config path (`<repo>/.impeller/config.toml`).
pub fn project_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(PROJECT_CONFIG_DIR).join("config.toml")
}
