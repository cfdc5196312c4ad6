//! CLI Commands

pub mod check;
pub mod export;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context};
use autoqa_common::paths::{normalize_path, resolve_path, to_safe_relative_path};
use autoqa_common::runs_dir;
use autoqa_export::SpecSource;
use tracing::debug;

/// Specs named by a command argument: one file, or every `*.md` under a directory
pub fn discover_specs(cwd: &Path, target: &Path) -> anyhow::Result<Vec<SpecSource>> {
    let path = resolve_path(cwd, target);
    let shown = to_safe_relative_path(&path, cwd);

    let specs = if path.is_dir() {
        SpecSource::load_all(&path).with_context(|| format!("Failed to read specs under {shown}"))?
    } else if path.is_file() {
        vec![SpecSource::from_file(&path).with_context(|| format!("Failed to read spec {shown}"))?]
    } else {
        bail!("Spec not found: {shown}");
    };

    debug!(count = specs.len(), target = %shown, "Discovered specs");
    Ok(specs)
}

/// Spec path as recorded in the trace: relative to `cwd` when inside it
pub fn spec_path_in_project(path: &Path, cwd: &Path) -> PathBuf {
    let cwd = normalize_path(cwd);
    let path = normalize_path(path);
    match path.strip_prefix(&cwd) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path,
    }
}

/// The given run id, or the most recently modified run under `.autoqa/runs`
pub fn resolve_run_id(cwd: &Path, run_id: Option<String>) -> anyhow::Result<String> {
    if let Some(id) = run_id {
        return Ok(id);
    }

    let dir = runs_dir(cwd);
    let entries = std::fs::read_dir(&dir)
        .with_context(|| format!("No runs found under {}; pass --run-id", to_safe_relative_path(&dir, cwd)))?;

    let mut latest: Option<(SystemTime, String)> = None;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let newer = latest
            .as_ref()
            .map_or(true, |(time, id)| (modified, &name) > (*time, id));
        if newer {
            latest = Some((modified, name));
        }
    }

    let (_, id) = latest.context("No runs found; pass --run-id")?;
    debug!(run_id = %id, "Using latest run");
    Ok(id)
}
