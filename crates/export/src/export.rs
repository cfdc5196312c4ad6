//! Export entry points
//!
//! Export is validate-everything-then-write-once: the trace is read, every
//! element-targeting action is checked for a usable locator, all code is
//! generated, and only then is a single file written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use autoqa_common::paths::to_safe_relative_path;
use autoqa_common::{ActionRecord, MarkdownSpec, TraceStore};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::emit::{helper_import_path, render_test_file, test_name_from_spec_path};
use crate::error::{ExportError, ExportResult, MissingLocator};
use crate::paths::{ensure_export_dir, export_path, relative_export_path, DEFAULT_EXPORT_DIR};
use crate::playwright::GenContext;
use crate::template::parse_raw_spec_vars;

/// Inputs of one export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Project root
    pub cwd: PathBuf,
    pub run_id: String,
    pub spec_path: PathBuf,
    /// Rendered spec
    pub spec: MarkdownSpec,
    pub base_url: String,
    pub login_base_url: Option<String>,
    /// Spec Markdown before template rendering
    pub raw_spec_content: Option<String>,
    /// Export directory relative to `cwd`; defaults to `tests/autoqa`
    pub export_dir: Option<PathBuf>,
}

impl ExportOptions {
    pub fn new(
        cwd: impl Into<PathBuf>,
        run_id: impl Into<String>,
        spec_path: impl Into<PathBuf>,
        spec: MarkdownSpec,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            cwd: cwd.into(),
            run_id: run_id.into(),
            spec_path: spec_path.into(),
            spec,
            base_url: base_url.into(),
            login_base_url: None,
            raw_spec_content: None,
            export_dir: None,
        }
    }

    pub fn with_login_base_url(mut self, url: impl Into<String>) -> Self {
        self.login_base_url = Some(url.into());
        self
    }

    pub fn with_raw_spec(mut self, raw: impl Into<String>) -> Self {
        self.raw_spec_content = Some(raw.into());
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    fn export_dir(&self) -> &Path {
        self.export_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_EXPORT_DIR))
    }
}

/// A written export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSuccess {
    pub export_path: PathBuf,
    /// `<exportDir>/<file>`, safe to print
    pub relative_path: String,
}

/// Every `ok` element-targeting record without a usable locator, in trace order
pub fn missing_locators(records: &[ActionRecord]) -> Vec<MissingLocator> {
    records
        .iter()
        .filter(|r| r.is_ok() && r.tool_name.requires_locator() && !r.has_valid_chosen_locator())
        .map(MissingLocator::from_record)
        .collect()
}

/// Reject traces that cannot be exported at all
pub fn validate_records(records: &[ActionRecord]) -> ExportResult<()> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }
    let missing = missing_locators(records);
    if !missing.is_empty() {
        return Err(ExportError::MissingLocators(missing));
    }
    Ok(())
}

fn load_records(cwd: &Path, run_id: &str, spec_path: &Path) -> ExportResult<Vec<ActionRecord>> {
    let store = TraceStore::for_run(cwd, run_id);
    debug!(trace = %to_safe_relative_path(store.path(), cwd), "Reading trace");
    store
        .records_for_spec(cwd, spec_path)
        .map_err(ExportError::TraceRead)
}

/// Compile already-loaded records into file content without touching disk
pub fn compile(options: &ExportOptions, records: &[ActionRecord]) -> ExportResult<String> {
    validate_records(records)?;

    let step_vars = options
        .raw_spec_content
        .as_deref()
        .map(parse_raw_spec_vars)
        .unwrap_or_else(BTreeMap::new);
    let ctx = GenContext::new(&options.base_url, options.login_base_url.as_deref());

    let plan = aggregate(&options.spec, records, &step_vars, ctx).map_err(ExportError::Codegen)?;

    let test_name = test_name_from_spec_path(&options.spec_path.to_string_lossy());
    let helper = helper_import_path(&options.cwd, options.export_dir());
    Ok(render_test_file(&plan, &test_name, &helper))
}

/// Export a Playwright test for one spec from the trace of `options.run_id`
pub fn export_from_trace(options: &ExportOptions) -> ExportResult<ExportSuccess> {
    let records = load_records(&options.cwd, &options.run_id, &options.spec_path)?;
    debug!(records = records.len(), "Compiling spec");
    let content = compile(options, &records)?;

    let export_dir = options.export_dir.as_deref();
    ensure_export_dir(&options.cwd, export_dir).map_err(|source| ExportError::Write {
        action: "create export directory",
        source,
    })?;

    let path = export_path(&options.cwd, &options.spec_path, export_dir);
    let relative_path = relative_export_path(&options.cwd, &options.spec_path, export_dir);
    std::fs::write(&path, content).map_err(|source| ExportError::Write {
        action: "write export file",
        source,
    })?;

    info!(path = %relative_path, "Exported Playwright test");
    Ok(ExportSuccess {
        export_path: path,
        relative_path,
    })
}

/// Whether a spec's trace can be exported, without writing anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exportability {
    pub exportable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_locators: Vec<MissingLocator>,
}

impl From<ExportResult<()>> for Exportability {
    fn from(result: ExportResult<()>) -> Self {
        match result {
            Ok(()) => Self {
                exportable: true,
                reason: None,
                code: None,
                missing_locators: Vec::new(),
            },
            Err(err) => Self {
                exportable: false,
                reason: Some(err.to_string()),
                code: Some(err.code()),
                missing_locators: err.missing_locators().map(<[_]>::to_vec).unwrap_or_default(),
            },
        }
    }
}

/// Check that a trace exists for the spec and every element action has a locator
pub fn check_exportable(cwd: &Path, run_id: &str, spec_path: &Path) -> Exportability {
    load_records(cwd, run_id, spec_path)
        .and_then(|records| validate_records(&records))
        .into()
}

/// Printable result of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_locators: Vec<MissingLocator>,
}

impl From<&ExportResult<ExportSuccess>> for ExportOutcome {
    fn from(result: &ExportResult<ExportSuccess>) -> Self {
        match result {
            Ok(success) => Self {
                ok: true,
                relative_path: Some(success.relative_path.clone()),
                code: None,
                reason: None,
                missing_locators: Vec::new(),
            },
            Err(err) => Self {
                ok: false,
                relative_path: None,
                code: Some(err.code()),
                reason: Some(err.reason()),
                missing_locators: err.missing_locators().map(<[_]>::to_vec).unwrap_or_default(),
            },
        }
    }
}
