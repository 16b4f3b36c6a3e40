//! Subprocess execution utilities.
//!
//! All external tools (gclient, GN, ninja, cmake, git, dotnet, nm) are run
//! through a [`CommandRunner`] so the orchestrators can be exercised without
//! a real toolchain. Tool lookup goes through an explicit [`SearchPath`]
//! instead of mutating the process-wide `PATH`.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::core::errors::NativeError;

/// Directories searched for executables, in priority order.
///
/// Extra directories are prepended to the inherited `PATH`. The value is
/// handed to every child process through [`ProcessBuilder::search_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    prepend: Vec<PathBuf>,
    base: Option<OsString>,
}

impl SearchPath {
    /// Search path inheriting the current process `PATH`.
    pub fn inherit() -> Self {
        SearchPath {
            prepend: Vec::new(),
            base: std::env::var_os("PATH"),
        }
    }

    /// Search path made only of the given directories.
    pub fn isolated(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        SearchPath {
            prepend: dirs.into_iter().collect(),
            base: None,
        }
    }

    /// Prepend a directory (highest priority).
    pub fn prepend(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prepend.insert(0, dir.into());
        self
    }

    /// Directories explicitly added on top of the inherited `PATH`.
    pub fn extra_dirs(&self) -> &[PathBuf] {
        &self.prepend
    }

    /// Every directory searched, in order.
    pub fn dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.prepend.clone();
        if let Some(ref base) = self.base {
            dirs.extend(std::env::split_paths(base));
        }
        dirs
    }

    /// The joined `PATH` value for child processes.
    pub fn to_os_string(&self) -> Result<OsString> {
        std::env::join_paths(self.dirs()).context("search path contains an invalid entry")
    }

    /// Locate an executable on this search path.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        let paths = self.to_os_string().ok()?;
        let cwd = std::env::current_dir().ok()?;
        which::which_in(name, Some(paths), cwd).ok()
    }

    /// Locate the first of several candidate executables.
    pub fn which_any(&self, names: &[&str]) -> Option<PathBuf> {
        names.iter().find_map(|name| self.which(name))
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, OsString>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run the child with `PATH` set to the given search path.
    pub fn search_path(self, search: &SearchPath) -> Result<Self> {
        let path = search.to_os_string()?;
        Ok(self.env("PATH", path))
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn get_env(&self, key: &str) -> Option<&OsStr> {
        self.env.get(key).map(OsString::as_os_str)
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Captured result of a subprocess run.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    /// Exit code (-1 when the child was terminated by a signal).
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Executes external commands.
///
/// Both methods block until the child exits. No timeout is applied.
pub trait CommandRunner {
    /// Run with inherited stdio, returning the exit code.
    fn status(&self, cmd: &ProcessBuilder) -> Result<i32>;

    /// Run with captured stdout/stderr.
    fn output(&self, cmd: &ProcessBuilder) -> Result<CapturedOutput>;
}

/// Runs commands as real child processes.
///
/// Children stay in the caller's process group, so a terminal interrupt
/// reaches the running tool as well as this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn status(&self, cmd: &ProcessBuilder) -> Result<i32> {
        let status = cmd
            .build_command()
            .stdin(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to execute `{}`", cmd.get_program().display()))?;
        Ok(status.code().unwrap_or(-1))
    }

    fn output(&self, cmd: &ProcessBuilder) -> Result<CapturedOutput> {
        let output = cmd
            .build_command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to spawn `{}`", cmd.get_program().display()))?;

        Ok(CapturedOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command, failing with [`NativeError::CommandFailed`] on a non-zero exit.
pub fn run_checked(runner: &dyn CommandRunner, cmd: &ProcessBuilder) -> Result<()> {
    let shown = cmd.display_command();
    tracing::info!("$ {}", shown);

    let code = runner.status(cmd)?;
    if code != 0 {
        return Err(NativeError::CommandFailed {
            command: shown,
            code,
        }
        .into());
    }
    Ok(())
}
