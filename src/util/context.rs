//! Global context for impeller-build operations.
//!
//! Resolves the repository root once, loads configuration, and answers
//! every "where does X live" question relative to that root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::layout::{
    Library, StagingLayout, DEFAULT_ARTIFACTS_DIR, DEFAULT_FRAMEWORK, DEFAULT_STAGING_PROJECTS,
};
use crate::util::config::{global_config_path, load_config, project_config_path, Config, PROJECT_CONFIG_DIR};
use crate::util::process::SearchPath;

/// Default depot_tools checkout, relative to the repository root.
pub const DEFAULT_DEPOT_TOOLS: &str = "extern/depot_tools";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Repository root all relative paths resolve against
    repo_root: PathBuf,

    /// Merged global + project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current directory.
    ///
    /// `repo_root` overrides root discovery (`--repo-root` / `IMPELLER_REPO_ROOT`).
    pub fn new(repo_root: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::at(cwd, repo_root))
    }

    /// Create a context with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        Self::at(cwd, None)
    }

    fn at(cwd: PathBuf, repo_root: Option<PathBuf>) -> Self {
        let repo_root = match repo_root {
            Some(root) => cwd.join(root),
            None => find_repo_root(&cwd).unwrap_or_else(|| cwd.clone()),
        };
        let config = load_config(global_config_path().as_deref(), &project_config_path(&repo_root));
        tracing::debug!("repository root: {}", repo_root.display());

        GlobalContext {
            cwd,
            repo_root,
            config,
        }
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a possibly relative path against the repository root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.repo_root.join(path)
    }

    /// Pick the CLI value, then the configured value, then the default.
    pub fn resolve_or(
        &self,
        cli: Option<&Path>,
        configured: Option<&PathBuf>,
        default: &str,
    ) -> PathBuf {
        match cli {
            Some(path) => self.cwd.join(path),
            None => self.resolve(configured.map(PathBuf::as_path).unwrap_or(Path::new(default))),
        }
    }

    /// Shared artifact tree root.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.resolve_or(None, self.config.paths.artifacts_dir.as_ref(), DEFAULT_ARTIFACTS_DIR)
    }

    /// Checkout location for a library.
    pub fn checkout(&self, library: Library, cli: Option<&Path>) -> PathBuf {
        let configured = match library {
            Library::Impeller => self.config.paths.flutter_root.as_ref(),
            Library::Rive => self.config.paths.rive_root.as_ref(),
        };
        self.resolve_or(cli, configured, library.default_checkout())
    }

    pub fn depot_tools(&self) -> PathBuf {
        self.resolve_or(None, self.config.paths.depot_tools.as_ref(), DEFAULT_DEPOT_TOOLS)
    }

    /// Inherited `PATH` with depot_tools in front.
    pub fn search_path(&self) -> SearchPath {
        SearchPath::inherit().prepend(self.depot_tools())
    }

    /// Managed projects receiving staged binaries right after a build of `library`.
    pub fn staging_layout(&self, library: Library) -> StagingLayout {
        self.staging_with_defaults(library.default_staging_projects())
    }

    /// Managed projects refreshed by `impeller-build stage`: every default
    /// project, whatever the library.
    pub fn restaging_layout(&self) -> StagingLayout {
        self.staging_with_defaults(DEFAULT_STAGING_PROJECTS)
    }

    fn staging_with_defaults(&self, defaults: &[&str]) -> StagingLayout {
        let framework = self
            .config
            .staging
            .framework
            .clone()
            .unwrap_or_else(|| DEFAULT_FRAMEWORK.to_string());

        let projects = match self.config.staging.projects {
            Some(ref projects) => projects.iter().map(|p| self.resolve(p)).collect(),
            None => defaults.iter().map(|p| self.resolve(p)).collect(),
        };
        StagingLayout::new(projects, framework)
    }
}

/// Walk upward from `start` to the first directory holding `.impeller/` or `.git`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_CONFIG_DIR).is_dir() || dir.join(".git").exists())
        .map(Path::to_path_buf)
}
