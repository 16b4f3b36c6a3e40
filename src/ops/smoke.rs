//! Export check for a built runtime library.
//!
//! Picks the shared library out of a `<rid>/native` directory and asks the
//! platform symbol tool for its exports: `dumpbin /EXPORTS` for Windows RIDs,
//! `nm -g` everywhere else.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::NativeError;
use crate::core::platform::Rid;
use crate::util::fs::glob_files;
use crate::util::process::{CommandRunner, ProcessBuilder, SearchPath};

pub const DEFAULT_SYMBOLS: &[&str] = &["rive_init", "rive_shutdown", "rive_factory"];

/// Library patterns, in preference order.
const LIBRARY_PATTERNS: &[&str] = &["*.dll", "*.dylib", "*.so"];

#[derive(Debug, Clone)]
pub struct SmokeOptions {
    /// `<rid>/native` directory holding the built library.
    pub artifact_dir: PathBuf,
    pub rid: Rid,
    /// Symbols that must be exported.
    pub symbols: Vec<String>,
}

impl SmokeOptions {
    pub fn new(artifact_dir: impl Into<PathBuf>, rid: Rid) -> Self {
        SmokeOptions {
            artifact_dir: artifact_dir.into(),
            rid,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmokeResult {
    pub library: PathBuf,
    /// Number of exported symbols found.
    pub exported: usize,
}

/// First shared library in `dir`: any DLL, else any dylib, else any `.so`.
pub fn find_library(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(NativeError::InputMissing {
            what: "artifact directory".to_string(),
            path: dir.to_path_buf(),
        }
        .into());
    }

    for pattern in LIBRARY_PATTERNS {
        if let Some(first) = glob_files(dir, &[pattern.to_string()])?.into_iter().next() {
            return Ok(first);
        }
    }

    Err(NativeError::NoArtifactsFound {
        dir: dir.to_path_buf(),
        patterns: LIBRARY_PATTERNS.iter().map(|p| p.to_string()).collect(),
    }
    .into())
}

fn is_windows(rid: &Rid) -> bool {
    rid.as_str().starts_with("win-")
}

/// Exported names from `nm -g` output. Undefined references are skipped.
///
/// Mach-O prefixes C symbols with `_`; pass `strip_underscore` to drop it.
pub fn parse_nm(output: &str, strip_underscore: bool) -> BTreeSet<String> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [_, kind, name, ..] if !kind.eq_ignore_ascii_case("u") => Some(*name),
                _ => None,
            }
        })
        .map(|name| {
            let name = if strip_underscore {
                name.strip_prefix('_').unwrap_or(name)
            } else {
                name
            };
            name.to_string()
        })
        .collect()
}

/// Exported names from `dumpbin /EXPORTS` output.
///
/// Export rows read `ordinal hint RVA name`; everything else is ignored.
pub fn parse_dumpbin(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [ordinal, hint, rva, name, ..]
                    if ordinal.parse::<u32>().is_ok()
                        && u32::from_str_radix(hint, 16).is_ok()
                        && u64::from_str_radix(rva, 16).is_ok() =>
                {
                    Some(name.to_string())
                }
                _ => None,
            }
        })
        .collect()
}

/// Exported symbols of `library`.
pub fn exported_symbols(
    runner: &dyn CommandRunner,
    search: &SearchPath,
    library: &Path,
    rid: &Rid,
) -> Result<BTreeSet<String>> {
    let (tool, args, hint): (&str, &[&str], &str) = if is_windows(rid) {
        ("dumpbin", &["/EXPORTS"], "Run from a Visual Studio developer prompt")
    } else {
        ("nm", &["-g"], "Install binutils (Linux) or the Xcode command line tools (macOS)")
    };
    let program = search.which(tool).ok_or_else(|| NativeError::GeneratorToolMissing {
        tool: tool.to_string(),
        hint: Some(hint.to_string()),
    })?;

    let cmd = ProcessBuilder::new(program)
        .args(args)
        .arg(library)
        .search_path(search)?;
    tracing::info!("$ {}", cmd.display_command());

    let output = runner.output(&cmd)?;
    if !output.success() {
        return Err(NativeError::CommandFailed {
            command: cmd.display_command(),
            code: output.code,
        }
        .into());
    }

    Ok(if is_windows(rid) {
        parse_dumpbin(&output.stdout)
    } else {
        parse_nm(&output.stdout, rid.as_str().starts_with("osx-"))
    })
}

/// Check that the library in `opts.artifact_dir` exports every expected symbol.
pub fn smoke(
    runner: &dyn CommandRunner,
    search: &SearchPath,
    opts: &SmokeOptions,
) -> Result<SmokeResult> {
    let library = find_library(&opts.artifact_dir)?;
    let exported = exported_symbols(runner, search, &library, &opts.rid)?;

    let missing: Vec<String> = opts
        .symbols
        .iter()
        .filter(|symbol| !exported.contains(*symbol))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(NativeError::MissingSymbols {
            library,
            symbols: missing,
        }
        .into());
    }

    Ok(SmokeResult {
        library,
        exported: exported.len(),
    })
}
