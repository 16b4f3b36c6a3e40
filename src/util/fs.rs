//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Read a file if it exists.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        read_to_string(path).map(Some)
    } else {
        Ok(None)
    }
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Copy a file, keeping its permissions and modification time.
///
/// An existing destination is overwritten.
pub fn copy_preserving(src: &Path, dst: &Path) -> Result<u64> {
    // A read-only copy from a previous run cannot be truncated in place.
    if fs::metadata(dst).is_ok_and(|m| m.permissions().readonly()) {
        fs::remove_file(dst)
            .with_context(|| format!("failed to replace {}", dst.display()))?;
    }

    let bytes = fs::copy(src, dst).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dst.display())
    })?;

    let modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .with_context(|| format!("failed to read metadata: {}", src.display()))?;
    fs::File::options()
        .append(true)
        .open(dst)
        .or_else(|_| fs::File::open(dst))
        .and_then(|f| f.set_modified(modified))
        .with_context(|| format!("failed to set modification time: {}", dst.display()))?;

    Ok(bytes)
}

/// Regular files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Result<Vec<String>> {
    Ok(list_files(dir)?
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect())
}

/// Find files matching glob patterns relative to a base directory.
///
/// Results are de-duplicated and sorted.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        // Escape the base so bracket characters in directory names are literal.
        let escaped_base = glob::Pattern::escape(&base.to_string_lossy());
        let full_pattern = Path::new(&escaped_base).join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Render a path for reports: relative to `root` when inside it, otherwise
/// absolute, always with forward slashes.
pub fn display_path(path: &Path, root: &Path) -> String {
    let shown = path
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .or_else(|_| {
            normalize_path(path)
                .strip_prefix(normalize_path(root))
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|_| normalize_path(path));
    shown.to_string_lossy().replace('\\', "/")
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_glob_files_dedups_overlapping_patterns() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("librive_ffi.so"), "x").unwrap();
        fs::write(tmp.path().join("librive.so"), "x").unwrap();
        fs::write(tmp.path().join("readme.txt"), "x").unwrap();

        let files = glob_files(
            tmp.path(),
            &["librive_ffi*.so".to_string(), "librive*.so".to_string()],
        )
        .unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("librive.so"));
    }

    #[test]
    fn test_copy_preserving_keeps_mtime_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("libimpeller.so");
        let dst = tmp.path().join("copy.so");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old contents").unwrap();

        let past = SystemTime::now() - Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        copy_preserving(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
        assert_eq!(
            fs::metadata(&dst).unwrap().modified().unwrap(),
            fs::metadata(&src).unwrap().modified().unwrap()
        );
    }

    #[test]
    fn test_list_files_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(list_files(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_display_path() {
        let tmp = TempDir::new().unwrap();
        let inner = tmp.path().join("docs").join("api-summary.md");
        assert_eq!(display_path(&inner, tmp.path()), "docs/api-summary.md");
    }
}
