//! Pipeline error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::platform::Rid;
use crate::util::diagnostic::Diagnostic;

/// A RID whose staged native artifacts could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArtifact {
    pub library: String,
    pub rid: Rid,
    pub path: PathBuf,
}

impl std::fmt::Display for MissingArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} artifacts missing for {} under {}",
            self.library,
            self.rid,
            self.path.display()
        )
    }
}

/// Failure raised by one of the build, staging, packaging or coverage steps.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum NativeError {
    #[error("unsupported architecture '{arch}'")]
    #[diagnostic(
        code(impeller_build::platform::arch),
        help("Supported architectures: x64 (x86_64, amd64), arm64 (aarch64)")
    )]
    UnsupportedArchitecture { arch: String },

    #[error("unsupported platform '{platform}'")]
    #[diagnostic(
        code(impeller_build::platform::os),
        help("Supported platforms: macos, linux, windows")
    )]
    UnsupportedPlatform { platform: String },

    #[error("unsupported configuration '{configuration}'")]
    #[diagnostic(code(impeller_build::platform::configuration), help("Use Debug or Release"))]
    UnsupportedConfiguration { configuration: String },

    #[error("{what} checkout not found at {}", path.display())]
    #[diagnostic(code(impeller_build::env::checkout_missing))]
    CheckoutMissing {
        what: String,
        path: PathBuf,
        #[help]
        hint: Option<String>,
    },

    #[error("gclient not found on the search path")]
    #[diagnostic(
        code(impeller_build::env::sync_tool_missing),
        help("Ensure the depot_tools submodule is present: `git submodule update --init extern/depot_tools`")
    )]
    SyncToolMissing { searched: Vec<PathBuf> },

    #[error("dependency sync failed with exit code {code}")]
    #[diagnostic(code(impeller_build::exec::sync_failed))]
    SyncFailed { command: String, code: i32 },

    #[error("GN script not found at {}", path.display())]
    #[diagnostic(
        code(impeller_build::env::generator_missing),
        help("The engine checkout is not hydrated. Run without --skip-sync to run `gclient sync`.")
    )]
    GeneratorMissing { path: PathBuf },

    #[error("{tool} build tool not found in PATH")]
    #[diagnostic(code(impeller_build::env::generator_tool_missing))]
    GeneratorToolMissing {
        tool: String,
        #[help]
        hint: Option<String>,
    },

    #[error("command failed with exit code {code}: {command}")]
    #[diagnostic(code(impeller_build::exec::command_failed))]
    CommandFailed { command: String, code: i32 },

    #[error("no native artifacts found in {}. Expected patterns: {}", dir.display(), patterns.join(", "))]
    #[diagnostic(code(impeller_build::artifacts::not_found))]
    NoArtifactsFound { dir: PathBuf, patterns: Vec<String> },

    #[error("no artifacts were staged from {}", root.display())]
    #[diagnostic(code(impeller_build::artifacts::not_staged))]
    NoArtifactsStaged { root: PathBuf },

    #[error("{}", missing.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    #[diagnostic(
        code(impeller_build::package::native_missing),
        help("Build the missing RIDs with `impeller-build engine`, or pass --skip-native-check")
    )]
    NativeArtifactsMissing { missing: Vec<MissingArtifact> },

    #[error("{} is out of date", path.display())]
    #[diagnostic(
        code(impeller_build::coverage::stale),
        help("Run `impeller-build coverage` to refresh the report")
    )]
    StaleReport { path: PathBuf },

    #[error("{what} not found: {}", path.display())]
    #[diagnostic(code(impeller_build::input_missing))]
    InputMissing { what: String, path: PathBuf },

    #[error("invalid prerelease suffix '{suffix}': {reason}")]
    #[diagnostic(code(impeller_build::package::version_suffix))]
    InvalidVersionSuffix { suffix: String, reason: String },

    #[error("missing symbols in {}: {}", library.display(), symbols.join(", "))]
    #[diagnostic(code(impeller_build::smoke::missing_symbols))]
    MissingSymbols { library: PathBuf, symbols: Vec<String> },
}

impl NativeError {
    /// Exit status the process should terminate with.
    ///
    /// Subprocess failures mirror the child's exit code; everything raised
    /// locally exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            NativeError::CommandFailed { code, .. } | NativeError::SyncFailed { code, .. }
                if *code > 0 =>
            {
                *code
            }
            _ => 1,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        match self {
            NativeError::CheckoutMissing { path, hint, .. } => {
                diag = diag.with_location(path);
                if let Some(hint) = hint {
                    diag = diag.with_suggestion(hint.clone());
                }
            }
            NativeError::SyncToolMissing { searched } => {
                for dir in searched {
                    diag = diag.with_context(format!("searched {}", dir.display()));
                }
                diag = diag.with_suggestion(
                    "Initialize depot_tools: `git submodule update --init extern/depot_tools`",
                );
            }
            NativeError::SyncFailed { command, .. } | NativeError::CommandFailed { command, .. } => {
                diag = diag.with_context(format!("command: {}", command));
            }
            NativeError::GeneratorMissing { path } => {
                diag = diag
                    .with_location(path)
                    .with_suggestion("Run the engine build without --skip-sync to hydrate the checkout");
            }
            NativeError::GeneratorToolMissing { hint, .. } => {
                if let Some(hint) = hint {
                    diag = diag.with_suggestion(hint.clone());
                }
            }
            NativeError::NoArtifactsFound { dir, .. } => {
                diag = diag
                    .with_location(dir)
                    .with_suggestion("Check the build log; the toolchain may have produced no library");
            }
            NativeError::NoArtifactsStaged { .. } => {
                diag = diag.with_suggestion(
                    "Ensure the artifact tree is populated (<artifacts>/<library>/<rid>/native)",
                );
            }
            NativeError::NativeArtifactsMissing { missing } => {
                diag = Diagnostic::error(format!(
                    "native artifacts missing for {} RID(s)",
                    missing.len()
                ));
                for gap in missing {
                    diag = diag.with_context(gap.to_string());
                }
                diag = diag.with_suggestion(
                    "Build the missing RIDs with `impeller-build engine --platform <os> --arch <arch>`",
                );
            }
            NativeError::StaleReport { path } => {
                diag = diag
                    .with_location(path)
                    .with_suggestion("Run `impeller-build coverage` to refresh the report");
            }
            NativeError::InputMissing { path, .. } => {
                diag = diag.with_location(path);
            }
            _ => {}
        }

        diag
    }
}
