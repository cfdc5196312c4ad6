//! Export file naming and locations

use std::io;
use std::path::{Path, PathBuf};

use autoqa_common::paths::{normalize_path, resolve_path, sanitize_path_segment, to_safe_relative_path, to_slash_path};

/// Export directory used when none is configured, relative to the project root
pub const DEFAULT_EXPORT_DIR: &str = "tests/autoqa";

/// Deterministic `.spec.ts` file name for a spec.
///
/// The spec path relative to `cwd` (or its file name when outside) has its
/// `.md` extension removed and separators turned into `-`.
pub fn export_file_name(spec_path: &Path, cwd: &Path) -> String {
    let resolved = resolve_path(cwd, spec_path);
    let relative = match resolved.strip_prefix(normalize_path(cwd)) {
        Ok(rel) => to_slash_path(rel),
        Err(_) => resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let stem = match relative.len().checked_sub(3) {
        Some(cut) if relative.is_char_boundary(cut) && relative[cut..].eq_ignore_ascii_case(".md") => {
            &relative[..cut]
        }
        _ => relative.as_str(),
    };
    let flattened = stem.replace(['/', '\\'], "-");

    format!("{}.spec.ts", sanitize_path_segment(&flattened))
}

/// Absolute export directory
pub fn export_dir(cwd: &Path, dir: Option<&Path>) -> PathBuf {
    resolve_path(cwd, dir.unwrap_or_else(|| Path::new(DEFAULT_EXPORT_DIR)))
}

/// Absolute path of the exported file
pub fn export_path(cwd: &Path, spec_path: &Path, dir: Option<&Path>) -> PathBuf {
    export_dir(cwd, dir).join(export_file_name(spec_path, cwd))
}

/// Export path safe to print, e.g. `tests/autoqa/specs-login.spec.ts`
pub fn relative_export_path(cwd: &Path, spec_path: &Path, dir: Option<&Path>) -> String {
    to_safe_relative_path(&export_path(cwd, spec_path, dir), cwd)
}

/// Create the export directory if missing
pub fn ensure_export_dir(cwd: &Path, dir: Option<&Path>) -> io::Result<PathBuf> {
    let dir = export_dir(cwd, dir);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
