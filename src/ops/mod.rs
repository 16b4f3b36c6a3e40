//! High-level operations.
//!
//! One module per `impeller-build` subcommand. Each takes explicit options
//! and a [`CommandRunner`](crate::util::process::CommandRunner) where it
//! drives external tools, so the binary stays a thin argument layer.

pub mod build_native;
pub mod coverage;
pub mod doctor;
pub mod package;
pub mod smoke;
pub mod stage;

pub use build_native::{build_native, BuildNativeOptions, BuildNativeResult};
pub use coverage::{CoverageOptions, CoverageOutcome, CoverageReport, CoverageRun};
pub use doctor::{doctor, format_report, CheckResult, DoctorReport, DoctorScope};
pub use package::{package, PackageOptions};
pub use smoke::{smoke, SmokeOptions, SmokeResult};
pub use stage::{stage_artifact_tree, stage_artifacts, StageSummary};
