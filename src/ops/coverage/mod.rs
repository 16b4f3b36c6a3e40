//! Interop API coverage report.
//!
//! Compares the functions `impeller.h` exports against the entry points the
//! managed bindings declare and keeps `docs/api-summary.md` in sync. In check
//! mode nothing is written; a stale or missing report is an error instead.

pub mod extract;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;

use crate::core::errors::NativeError;
use crate::util::fs::{display_path, read_optional, write_string};

pub use extract::{bound_entry_points, load_bound_entry_points, load_native_exports, native_exports};
pub use report::CoverageReport;

pub const DEFAULT_HEADER: &str = "extern/flutter/engine/src/flutter/impeller/toolkit/interop/impeller.h";
pub const DEFAULT_INTEROP_DIR: &str = "src/ImpellerSharp.Interop";
pub const DEFAULT_OUTPUT: &str = "docs/api-summary.md";
pub const DEFAULT_SYMBOL_PREFIX: &str = "Impeller";

/// Inputs for one coverage run. Paths are absolute.
#[derive(Debug, Clone)]
pub struct CoverageOptions {
    /// Root used to shorten paths in the report.
    pub repo_root: PathBuf,
    pub header: PathBuf,
    pub interop_dir: PathBuf,
    pub output: PathBuf,
    /// Verify instead of write.
    pub check: bool,
    pub symbol_prefix: String,
}

impl CoverageOptions {
    /// Options with every path at its default below `repo_root`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        CoverageOptions {
            header: repo_root.join(DEFAULT_HEADER),
            interop_dir: repo_root.join(DEFAULT_INTEROP_DIR),
            output: repo_root.join(DEFAULT_OUTPUT),
            repo_root,
            check: false,
            symbol_prefix: DEFAULT_SYMBOL_PREFIX.to_string(),
        }
    }
}

/// What a coverage run did with the report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageOutcome {
    /// Report was created or rewritten.
    Written,
    /// Report already matched; left untouched.
    Unchanged,
    /// Check mode and the report matches.
    UpToDate,
}

/// Result of a coverage run.
#[derive(Debug, Clone)]
pub struct CoverageRun {
    pub report: CoverageReport,
    pub outcome: CoverageOutcome,
}

/// Compute coverage and write (or verify) the report.
pub fn run(opts: &CoverageOptions) -> Result<CoverageRun> {
    if !opts.header.is_file() {
        return Err(NativeError::InputMissing {
            what: "header".to_string(),
            path: opts.header.clone(),
        }
        .into());
    }
    if !opts.interop_dir.is_dir() {
        return Err(NativeError::InputMissing {
            what: "interop directory".to_string(),
            path: opts.interop_dir.clone(),
        }
        .into());
    }

    let native = load_native_exports(&opts.header, &opts.symbol_prefix)?;
    let bound = load_bound_entry_points(&opts.interop_dir, &opts.symbol_prefix)?;
    let report = CoverageReport::compute(native, bound);
    tracing::debug!(
        "{} exports, {} bindings, {:.2}% covered",
        report.native.len(),
        report.bound.len(),
        report.coverage_percent()
    );

    let rendered = report.render(
        &display_path(&opts.header, &opts.repo_root),
        &display_path(&opts.interop_dir, &opts.repo_root),
        &report::timestamp()?,
    );
    let existing = read_optional(&opts.output)?;
    let current = existing
        .as_deref()
        .is_some_and(|text| report::normalize(text) == report::normalize(&rendered));

    let outcome = if opts.check {
        if !current {
            return Err(NativeError::StaleReport {
                path: opts.output.clone(),
            }
            .into());
        }
        CoverageOutcome::UpToDate
    } else if current {
        CoverageOutcome::Unchanged
    } else {
        write_string(&opts.output, &rendered)?;
        CoverageOutcome::Written
    };

    Ok(CoverageRun { report, outcome })
}
