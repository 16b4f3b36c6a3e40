//! Environment and toolchain health checks.
//!
//! `impeller-build doctor` looks up every external tool the pipeline drives
//! on the same search path the builds use (depot_tools first), and checks
//! that the native checkouts are present. Which checks are required depends
//! on the scope asked for; the rest are reported as optional.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::core::layout::Library;
use crate::util::process::SearchPath;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Resolved tool or checkout path
    pub path: Option<PathBuf>,

    /// Whether a failure should fail the run
    pub required: bool,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            required: true,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: false,
            message: message.into(),
            path: None,
            required: true,
        }
    }

    /// Set whether this check is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    pub total_duration: Duration,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// Which part of the pipeline the environment must support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DoctorScope {
    /// GN + Ninja engine build.
    Engine,
    /// CMake runtime build.
    Runtime,
    /// NuGet packaging.
    Package,
    #[default]
    All,
}

impl DoctorScope {
    fn covers(self, other: DoctorScope) -> bool {
        self == DoctorScope::All || self == other
    }
}

impl FromStr for DoctorScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "engine" => Ok(DoctorScope::Engine),
            "runtime" => Ok(DoctorScope::Runtime),
            "package" => Ok(DoctorScope::Package),
            "all" => Ok(DoctorScope::All),
            _ => Err(format!(
                "unknown scope '{}'. Use engine, runtime, package or all",
                s
            )),
        }
    }
}

/// One tool lookup: accepted names, and the scopes that need it.
struct ToolCheck {
    label: &'static str,
    names: &'static [&'static str],
    needed_by: &'static [DoctorScope],
    hint: &'static str,
}

const TOOLS: &[ToolCheck] = &[
    ToolCheck {
        label: "git",
        names: &["git"],
        needed_by: &[DoctorScope::Engine, DoctorScope::Runtime],
        hint: "install git",
    },
    ToolCheck {
        label: "python",
        names: &["python3", "python"],
        needed_by: &[DoctorScope::Engine],
        hint: "install Python 3 (GN is invoked through it)",
    },
    ToolCheck {
        label: "gclient",
        names: &["gclient"],
        needed_by: &[DoctorScope::Engine],
        hint: "run `git submodule update --init extern/depot_tools`",
    },
    ToolCheck {
        label: "ninja",
        names: &["ninja"],
        needed_by: &[DoctorScope::Engine, DoctorScope::Runtime],
        hint: "install ninja or use the copy shipped with depot_tools",
    },
    ToolCheck {
        label: "cmake",
        names: &["cmake"],
        needed_by: &[DoctorScope::Runtime],
        hint: "install CMake 3.20 or newer",
    },
    ToolCheck {
        label: "dotnet",
        names: &["dotnet"],
        needed_by: &[DoctorScope::Package],
        hint: "install the .NET 8 SDK",
    },
];

/// Run every check.
///
/// `checkouts` lists the native source trees to verify, one per library.
pub fn doctor(search: &SearchPath, checkouts: &[(Library, PathBuf)], scope: DoctorScope) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    for tool in TOOLS {
        let required = tool.needed_by.iter().any(|s| scope.covers(*s));
        report.add(check_tool(search, tool).required(required));
    }

    for (library, path) in checkouts {
        let needed_by = match library {
            Library::Impeller => DoctorScope::Engine,
            Library::Rive => DoctorScope::Runtime,
        };
        report.add(check_checkout(*library, path).required(scope.covers(needed_by)));
    }

    report.total_duration = start.elapsed();
    report
}

fn check_tool(search: &SearchPath, tool: &ToolCheck) -> CheckResult {
    match search.which_any(tool.names) {
        Some(path) => {
            tracing::debug!("{} -> {}", tool.label, path.display());
            CheckResult::pass(tool.label, format!("{} is available", tool.label)).with_path(path)
        }
        None => CheckResult::fail(
            tool.label,
            format!("not found (tried {}); {}", tool.names.join(", "), tool.hint),
        ),
    }
}

fn check_checkout(library: Library, path: &std::path::Path) -> CheckResult {
    let name = format!("{} checkout", library.display_name());
    if path.is_dir() {
        CheckResult::pass(name, "present").with_path(path.to_path_buf())
    } else {
        CheckResult::fail(name, format!("missing at {}", path.display())).with_path(path.to_path_buf())
    }
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "impeller-build doctor");
    let _ = writeln!(output, "=====================\n");

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };

        let _ = writeln!(output, "  {} {}{}", status, check.name, required);

        if verbose || !check.passed {
            let _ = writeln!(output, "      {}", check.message);
        }
        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
        }
    }

    let _ = writeln!(output);

    let failed = report.failed_count();
    let required_failed = report.required_failed_count();
    let _ = writeln!(
        output,
        "Summary: {} passed, {} failed ({:.2?})",
        report.passed_count(),
        failed,
        report.total_duration
    );

    if required_failed > 0 {
        let _ = writeln!(output, "\n{} required check(s) failed.", required_failed);
    } else if failed > 0 {
        let _ = writeln!(
            output,
            "\nAll required checks passed. {} optional check(s) failed.",
            failed
        );
    } else {
        let _ = writeln!(output, "\nAll checks passed.");
    }

    output
}
