//! Symbol extraction from header and binding sources.
//!
//! Both sides are scanned with regular expressions rather than parsed; only
//! declaration names are needed. Results are sets, so a name declared twice
//! counts once.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

use crate::util::fs::read_to_string;

/// `[LibraryImport(..., EntryPoint = "Name")]` / `[DllImport(..., EntryPoint = "Name")]`,
/// possibly spread over several lines.
static ENTRY_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(?:LibraryImport|DllImport)\([^)]*?EntryPoint\s*=\s*"([^"]+)""#)
        .expect("entry point regex is valid")
});

/// Regex matching an `IMPELLER_EXPORT` function declaration whose name starts with `prefix`.
fn export_regex(prefix: &str) -> Result<Regex> {
    let name = if prefix.is_empty() {
        r"[A-Za-z_][A-Za-z0-9_]*".to_string()
    } else {
        format!(r"{}[A-Za-z0-9_]+", regex::escape(prefix))
    };
    let pattern = format!(
        r"IMPELLER_EXPORT(?:\s+IMPELLER_NODISCARD)?\s+(?:[A-Za-z0-9_\s\*]+?)[\s\*]+({})\s*\(",
        name
    );
    Regex::new(&pattern).with_context(|| format!("invalid symbol prefix '{}'", prefix))
}

/// Exported function names declared in header text.
///
/// Names starting with `__` are reserved and skipped.
pub fn native_exports(header: &str, prefix: &str) -> Result<BTreeSet<String>> {
    let re = export_regex(prefix)?;
    Ok(re
        .captures_iter(header)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !name.starts_with("__"))
        .map(str::to_string)
        .collect())
}

/// Entry points bound in one source file that start with `prefix`.
pub fn bound_entry_points(source: &str, prefix: &str) -> BTreeSet<String> {
    ENTRY_POINT_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| name.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

/// Read a header and extract its exports.
pub fn load_native_exports(header: &Path, prefix: &str) -> Result<BTreeSet<String>> {
    native_exports(&read_to_string(header)?, prefix)
}

/// Entry points bound by every `*.cs` file below `dir`.
pub fn load_bound_entry_points(dir: &Path, prefix: &str) -> Result<BTreeSet<String>> {
    let mut bound = BTreeSet::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "cs") {
            bound.extend(bound_entry_points(&read_to_string(path)?, prefix));
        }
    }

    Ok(bound)
}
