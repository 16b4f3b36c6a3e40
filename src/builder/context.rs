//! Build context - request, search path, and command runner for one build.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::NativeError;
use crate::core::request::BuildRequest;
use crate::util::process::{run_checked, CommandRunner, ProcessBuilder, SearchPath};

/// Everything an orchestrator needs besides its checkout.
#[derive(Clone)]
pub struct BuildContext<'a> {
    /// The build being performed
    pub request: BuildRequest,

    /// Repository root (submodule commands run here)
    pub repo_root: PathBuf,

    /// Search path handed to every child process
    pub search: SearchPath,

    runner: &'a dyn CommandRunner,
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("request", &self.request)
            .field("repo_root", &self.repo_root)
            .field("search", &self.search)
            .finish()
    }
}

impl<'a> BuildContext<'a> {
    pub fn new(
        request: BuildRequest,
        repo_root: impl Into<PathBuf>,
        search: SearchPath,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        BuildContext {
            request,
            repo_root: repo_root.into(),
            search,
            runner,
        }
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner
    }

    /// Locate a tool on the build search path.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        let found = self.search.which(name);
        if let Some(ref path) = found {
            tracing::debug!("resolved {} -> {}", name, path.display());
        }
        found
    }

    /// Locate a tool the build cannot proceed without.
    pub fn require_tool(&self, name: &str, hint: &str) -> Result<PathBuf> {
        self.which(name).ok_or_else(|| {
            NativeError::GeneratorToolMissing {
                tool: name.to_string(),
                hint: Some(hint.to_string()),
            }
            .into()
        })
    }

    /// Start a command for `program` that runs with the build search path.
    pub fn command(&self, program: impl AsRef<Path>) -> Result<ProcessBuilder> {
        ProcessBuilder::new(program).search_path(&self.search)
    }

    /// Run a command, aborting on a non-zero exit.
    pub fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        run_checked(self.runner, cmd)
    }
}
