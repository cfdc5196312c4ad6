//! Read access to a run's action trace
//!
//! The agent appends one JSON [`ActionRecord`] per line to
//! `.autoqa/runs/<runId>/ir.jsonl`. The store is never modified here.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::{resolve_path, sanitize_path_segment};
use crate::types::ActionRecord;

/// File name of the trace inside a run directory
pub const TRACE_FILE_NAME: &str = "ir.jsonl";

/// Location of the trace for `run_id` under the project root `cwd`
pub fn trace_path(cwd: &Path, run_id: &str) -> PathBuf {
    crate::runs_dir(cwd)
        .join(sanitize_path_segment(run_id))
        .join(TRACE_FILE_NAME)
}

/// Parse newline-delimited records; blank lines are skipped
pub fn parse_records(content: &str) -> Result<Vec<ActionRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<ActionRecord>(line).map_err(|e| Error::MalformedRecord {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Read-only handle to one run's trace file
#[derive(Debug, Clone)]
pub struct TraceStore {
    path: PathBuf,
}

impl TraceStore {
    /// Store for `run_id` under the project root `cwd`
    pub fn for_run(cwd: &Path, run_id: &str) -> Self {
        Self::open(trace_path(cwd, run_id))
    }

    /// Store backed by an explicit trace file
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in file order
    pub fn read_all(&self) -> Result<Vec<ActionRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        parse_records(&content)
    }

    /// Records belonging to `spec_path`, in file order.
    ///
    /// Relative spec paths (in records or in the argument) are resolved
    /// against `cwd` before comparison.
    pub fn records_for_spec(&self, cwd: &Path, spec_path: &Path) -> Result<Vec<ActionRecord>> {
        let target = resolve_path(cwd, spec_path);
        let all = self.read_all()?;
        let total = all.len();

        let records: Vec<ActionRecord> = all
            .into_iter()
            .filter(|r| resolve_path(cwd, Path::new(&r.spec_path)) == target)
            .collect();

        debug!(total, matched = records.len(), "Loaded trace records for spec");
        Ok(records)
    }
}
