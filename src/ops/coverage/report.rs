//! Coverage set algebra and Markdown rendering.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const TITLE: &str = "# Impeller Interop API Coverage";
const GENERATED_PREFIX: &str = "_Generated on ";

/// Native exports compared against managed entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    pub native: BTreeSet<String>,
    pub bound: BTreeSet<String>,
}

impl CoverageReport {
    pub fn compute(native: BTreeSet<String>, bound: BTreeSet<String>) -> Self {
        CoverageReport { native, bound }
    }

    /// Exports that have a binding.
    pub fn shared(&self) -> BTreeSet<String> {
        self.native.intersection(&self.bound).cloned().collect()
    }

    /// Exports with no binding.
    pub fn missing_bound(&self) -> BTreeSet<String> {
        self.native.difference(&self.bound).cloned().collect()
    }

    /// Bindings pointing at something the header does not export.
    pub fn extra_bound(&self) -> BTreeSet<String> {
        self.bound.difference(&self.native).cloned().collect()
    }

    /// Share of exports that are bound, in percent. An empty header counts as
    /// fully covered.
    pub fn coverage_percent(&self) -> f64 {
        if self.native.is_empty() {
            return 100.0;
        }
        self.shared().len() as f64 / self.native.len() as f64 * 100.0
    }

    /// Render the Markdown document.
    ///
    /// `header` and `interop_dir` are the display forms of the inspected
    /// paths; `generated_at` is stamped verbatim into the document.
    pub fn render(&self, header: &str, interop_dir: &str, generated_at: &str) -> String {
        let rows = [
            ("Native exports in header", self.native.len().to_string()),
            ("Managed P/Invoke entry points", self.bound.len().to_string()),
            ("Shared exports (bound)", self.shared().len().to_string()),
            ("Missing managed bindings", self.missing_bound().len().to_string()),
            ("Extra managed bindings", self.extra_bound().len().to_string()),
            ("Coverage", format!("{:.2}%", self.coverage_percent())),
        ];

        let mut table = vec!["| Metric | Count |".to_string(), "| --- | --- |".to_string()];
        table.extend(rows.iter().map(|(name, value)| format!("| {} | {} |", name, value)));

        let sections = [
            section("Missing Managed Bindings", &self.missing_bound()),
            section("Extra Managed Bindings (no native export)", &self.extra_bound()),
        ];

        format!(
            "{TITLE}\n\n\
             {GENERATED_PREFIX}{generated_at} by `impeller-build coverage`._\n\n\
             - Header inspected: `{header}`\n\
             - Managed bindings: `{interop_dir}`\n\n\
             {}\n\n{}",
            table.join("\n"),
            sections.join("\n")
        )
    }
}

fn section(title: &str, items: &BTreeSet<String>) -> String {
    if items.is_empty() {
        return format!("## {}\n\n_None_\n", title);
    }
    let lines: Vec<String> = items.iter().map(|item| format!("- `{}`", item)).collect();
    format!("## {}\n\n{}\n", title, lines.join("\n"))
}

/// Current UTC time at second precision, e.g. `2026-01-05T12:00:00Z`.
pub fn timestamp() -> Result<String> {
    let now = OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .context("failed to truncate timestamp")?;
    now.format(&Rfc3339).context("failed to format timestamp")
}

/// Report text with the generation line removed, for staleness comparison.
///
/// Every other byte is kept, line endings included.
pub fn normalize(report: &str) -> String {
    report
        .split_inclusive('\n')
        .filter(|line| !line.starts_with(GENERATED_PREFIX))
        .collect()
}
