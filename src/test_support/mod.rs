//! Test utilities and mocks for unit tests.
//!
//! [`MockExecutor`] stands in for the real toolchain: it records every
//! command it is asked to run and answers with scripted exit codes, so the
//! orchestrators can be tested without GN, ninja, cmake or dotnet installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{MockExecutor, MockProcessOutput};
//!
//! let exec = MockExecutor::new();
//! exec.expect_prefix("cmake --build", MockProcessOutput::failure(2, "link error"));
//! exec.set_default(MockProcessOutput::success(""));
//! ```

pub mod fixtures;

use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{CapturedOutput, CommandRunner, ProcessBuilder};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

#[derive(Debug, Clone)]
struct CommandExpectation {
    pattern: CommandPattern,
    output: MockProcessOutput,
}

/// A command the mock was asked to run.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Program and arguments joined by spaces.
    pub command: String,
    /// Working directory, if one was set.
    pub cwd: Option<std::path::PathBuf>,
    /// `PATH` handed to the child, if one was set.
    pub path_env: Option<std::ffi::OsString>,
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<RecordedCall>,
    default_output: Option<MockProcessOutput>,
}

/// Mock command runner.
///
/// Expectations are checked in insertion order; the first match wins.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor that answers every command with success.
    pub fn permissive() -> Self {
        let exec = Self::new();
        exec.set_default(MockProcessOutput::success(""));
        exec
    }

    fn push(&self, pattern: CommandPattern, output: MockProcessOutput) -> &Self {
        self.state
            .lock()
            .unwrap()
            .expectations
            .push(CommandExpectation { pattern, output });
        self
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), output)
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        self.state.lock().unwrap().default_output = Some(output);
        self
    }

    /// All commands run so far, as display strings.
    pub fn calls(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|c| c.command.clone())
            .collect()
    }

    /// All commands run so far, with their working directory and `PATH`.
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn run(&self, cmd: &ProcessBuilder) -> Result<MockProcessOutput> {
        let full_cmd = cmd.display_command();
        let mut state = self.state.lock().unwrap();

        state.calls.push(RecordedCall {
            command: full_cmd.clone(),
            cwd: cmd.get_cwd().map(|p| p.to_path_buf()),
            path_env: cmd.get_env("PATH").map(|p| p.to_os_string()),
        });

        if let Some(exp) = state
            .expectations
            .iter()
            .find(|exp| exp.pattern.matches(&full_cmd))
        {
            return Ok(exp.output.clone());
        }

        if let Some(ref default) = state.default_output {
            return Ok(default.clone());
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

impl CommandRunner for MockExecutor {
    fn status(&self, cmd: &ProcessBuilder) -> Result<i32> {
        Ok(self.run(cmd)?.status)
    }

    fn output(&self, cmd: &ProcessBuilder) -> Result<CapturedOutput> {
        let out = self.run(cmd)?;
        Ok(CapturedOutput {
            code: out.status,
            stdout: out.stdout,
            stderr: out.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_first_match_wins() {
        let exec = MockExecutor::new();
        exec.expect_prefix("cmake --build", MockProcessOutput::failure(2, "link"));
        exec.expect_prefix("cmake", MockProcessOutput::success(""));

        let configure = ProcessBuilder::new("cmake").args(["-S", "."]);
        let build = ProcessBuilder::new("cmake").args(["--build", "out"]);

        assert_eq!(exec.status(&configure).unwrap(), 0);
        assert_eq!(exec.status(&build).unwrap(), 2);
        assert_eq!(exec.calls(), vec!["cmake -S .", "cmake --build out"]);
    }

    #[test]
    fn test_mock_executor_rejects_unexpected() {
        let exec = MockExecutor::new();
        assert!(exec.status(&ProcessBuilder::new("dotnet")).is_err());
    }
}
