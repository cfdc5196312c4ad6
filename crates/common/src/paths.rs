//! Path safety helpers
//!
//! Anything derived from user input (run ids, spec paths) goes through
//! [`sanitize_path_segment`] before it becomes part of a filesystem path, and
//! anything printed or logged goes through [`to_safe_relative_path`].

use std::path::{Component, Path, PathBuf};

/// Maximum length of a sanitized segment, in characters
pub const MAX_SEGMENT_LENGTH: usize = 200;

const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Reduce arbitrary input to a single safe path segment.
///
/// Strips characters that are invalid on common filesystems, removes `..`
/// traversal sequences, collapses runs of path separators into one `_`, trims
/// leading dots/underscores and truncates to [`MAX_SEGMENT_LENGTH`].
pub fn sanitize_path_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.replace("..", "");

    let mut collapsed = String::with_capacity(cleaned.len());
    let mut in_separator = false;
    for c in cleaned.chars() {
        if c == '/' || c == '\\' {
            if !in_separator {
                collapsed.push('_');
            }
            in_separator = true;
        } else {
            collapsed.push(c);
            in_separator = false;
        }
    }

    let trimmed = collapsed
        .trim_start_matches(['.', '_'])
        .trim_end_matches('_');
    let truncated: String = trimmed.chars().take(MAX_SEGMENT_LENGTH).collect();

    if truncated.is_empty() {
        "unknown".to_string()
    } else {
        truncated
    }
}

/// Lexically normalize a path, resolving `.` and `..` without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `path` against `cwd` when relative, then normalize
pub fn resolve_path(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&cwd.join(path))
    }
}

/// Render a relative path with `/` separators regardless of platform
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Convert a path to something safe for logs and user-facing output.
///
/// Paths under `cwd` become relative. Paths elsewhere are reduced to their
/// `.autoqa/...` tail or exported test file name when one is recognisable,
/// and redacted otherwise. An absolute path is never returned.
pub fn to_safe_relative_path(path: &Path, cwd: &Path) -> String {
    let path = normalize_path(path);
    let cwd = normalize_path(cwd);

    if let Ok(rel) = path.strip_prefix(&cwd) {
        return to_slash_path(rel);
    }
    if !path.is_absolute() {
        return to_slash_path(&path);
    }

    let components: Vec<_> = path.components().collect();
    if let Some(pos) = components
        .iter()
        .position(|c| c.as_os_str() == crate::AUTOQA_DIR)
    {
        let tail: PathBuf = components[pos..].iter().collect();
        return to_slash_path(&tail);
    }

    match path.file_name().map(|n| n.to_string_lossy()) {
        Some(name) if name.ends_with(".spec.ts") => name.into_owned(),
        _ => "[redacted]".to_string(),
    }
}
