//! Test fixtures for common test scenarios.
//!
//! Writers for the on-disk inputs the pipeline consumes: native headers,
//! managed binding sources, build output directories and staged artifact
//! trees.

use std::fs;
use std::path::{Path, PathBuf};

/// Header declaring `ImpellerContextCreate`, `ImpellerContextRelease` and
/// `ImpellerSurfaceCreate`, plus a reserved `__` export and a non-export.
pub const IMPELLER_HEADER: &str = r#"
#ifndef IMPELLER_H_
#define IMPELLER_H_

#define IMPELLER_EXPORT __attribute__((visibility("default")))
#define IMPELLER_NODISCARD [[nodiscard]]

IMPELLER_EXPORT IMPELLER_NODISCARD
ImpellerContext IMPELLER_NULLABLE ImpellerContextCreate(
    uint32_t version);

IMPELLER_EXPORT
void ImpellerContextRelease(ImpellerContext IMPELLER_NULLABLE context);

IMPELLER_EXPORT IMPELLER_NODISCARD
ImpellerSurface IMPELLER_NULLABLE ImpellerSurfaceCreate(
    ImpellerContext IMPELLER_NONNULL context,
    uint64_t fbo);

IMPELLER_EXPORT
uint32_t __ImpellerInternalHook(void);

uint32_t ImpellerNotExported(void);

#endif  // IMPELLER_H_
"#;

/// Bindings covering `ImpellerContextCreate` and `ImpellerContextRelease`.
pub const INTEROP_BINDINGS: &str = r#"
using System.Runtime.InteropServices;

namespace ImpellerSharp.Interop;

internal static unsafe partial class ImpellerNative
{
    [LibraryImport(LibraryName, EntryPoint = "ImpellerContextCreate")]
    internal static partial nint ContextCreate(uint version);

    [LibraryImport(
        LibraryName,
        EntryPoint = "ImpellerContextRelease")]
    internal static partial void ContextRelease(nint context);

    [DllImport("libc", EntryPoint = "free")]
    internal static extern void Free(nint ptr);
}
"#;

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
    path.to_path_buf()
}

/// Create empty placeholder binaries in `dir`.
pub fn touch_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    names
        .iter()
        .map(|name| write_file(&dir.join(name), format!("binary:{name}")))
        .collect()
}

/// Populate `<artifacts>/<library_dir>/<rid>/native` with the given files.
pub fn stage_rid(artifacts: &Path, library_dir: &str, rid: &str, names: &[&str]) -> PathBuf {
    let native = artifacts.join(library_dir).join(rid).join("native");
    touch_files(&native, names);
    native
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Create executable stubs for `names` in `dir` so search-path lookups succeed.
#[cfg(unix)]
pub fn fake_tools(dir: &Path, names: &[&str]) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    for name in names {
        let path = write_file(&dir.join(name), "#!/bin/sh\nexit 0\n");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    dir.to_path_buf()
}
