//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Native build, staging and packaging pipeline for ImpellerSharp
#[derive(Parser)]
#[command(name = "impeller-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Repository root (defaults to the nearest parent holding .impeller/ or .git)
    #[arg(long, global = true, env = "IMPELLER_REPO_ROOT")]
    pub repo_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the Impeller engine with GN and Ninja
    Engine(EngineArgs),

    /// Build the Rive runtime with CMake
    Runtime(RuntimeArgs),

    /// Copy an existing artifact tree into the managed projects
    Stage(StageArgs),

    /// Pack the NuGet packages
    Package(PackageArgs),

    /// Compare native exports with the managed bindings
    Coverage(CoverageArgs),

    /// Check that a built runtime library exports its entry points
    Smoke(SmokeArgs),

    /// Check the build environment
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Flags shared by both native orchestrators.
#[derive(Args)]
pub struct TargetArgs {
    /// Target platform (macos, linux, windows)
    #[arg(long)]
    pub platform: String,

    /// Target architecture (x64, arm64); defaults to the host
    #[arg(long)]
    pub arch: Option<String>,

    /// Build configuration (Debug, Release)
    #[arg(long, default_value = "Release")]
    pub configuration: String,

    /// Skip dependency hydration (gclient sync / submodule init)
    #[arg(long)]
    pub skip_sync: bool,

    /// Library artifact root (default: artifacts/native or artifacts/rive)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct EngineArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Flutter engine checkout (default: extern/flutter)
    #[arg(long)]
    pub flutter_root: Option<PathBuf>,
}

#[derive(Args)]
pub struct RuntimeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Rive runtime checkout (default: extern/rive)
    #[arg(long)]
    pub rive_root: Option<PathBuf>,

    /// Extra argument passed to the CMake configure step (repeatable)
    #[arg(long = "cmake-arg", allow_hyphen_values = true)]
    pub cmake_args: Vec<String>,
}

#[derive(Args)]
pub struct StageArgs {
    /// Library whose artifact tree to stage (impeller, rive)
    #[arg(long, default_value = "impeller")]
    pub library: String,

    /// Build configuration the managed projects are built in
    #[arg(long, default_value = "Release")]
    pub configuration: String,

    /// Artifact root (default: artifacts)
    #[arg(long)]
    pub artifacts: Option<PathBuf>,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Build configuration (Debug, Release)
    #[arg(long, default_value = "Release")]
    pub configuration: String,

    /// Package destination (default: artifacts/nuget)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Runtime identifier that must have native artifacts (repeatable)
    #[arg(long = "rid")]
    pub rids: Vec<String>,

    /// Pre-release suffix passed to `dotnet pack --version-suffix`
    #[arg(long)]
    pub prerelease_suffix: Option<String>,

    /// Pack even when native artifacts are missing
    #[arg(long)]
    pub skip_native_check: bool,
}

#[derive(Args)]
pub struct CoverageArgs {
    /// Native header to inspect
    #[arg(long)]
    pub header: Option<PathBuf>,

    /// Directory holding the managed bindings
    #[arg(long)]
    pub interop_dir: Option<PathBuf>,

    /// Report file (default: docs/api-summary.md)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Fail if the report is out of date instead of writing it
    #[arg(long)]
    pub check: bool,
}

#[derive(Args)]
pub struct SmokeArgs {
    /// `<rid>/native` directory holding the built library
    pub artifact_dir: PathBuf,

    /// Runtime identifier of the library (e.g. osx-arm64)
    #[arg(long)]
    pub rid: String,

    /// Symbol that must be exported (repeatable; replaces the defaults)
    #[arg(long = "symbol")]
    pub symbols: Vec<String>,
}

#[derive(Args)]
pub struct DoctorArgs {
    /// Which commands the environment must support (engine, runtime, package, all)
    #[arg(long, default_value = "all")]
    pub scope: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
