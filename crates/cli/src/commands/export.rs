//! Export Playwright tests from a recorded run

use std::path::{Path, PathBuf};

use autoqa_common::paths::to_safe_relative_path;
use autoqa_common::redact::{redact_url_credentials, truncate_string};
use autoqa_export::{export_from_trace, ExportOptions, ExportOutcome};
use clap::Args;
use serde::Serialize;
use tracing::{debug, warn};

use super::{discover_specs, resolve_run_id, spec_path_in_project};
use crate::config::AutoqaConfig;
use crate::output::{print_error, print_list, print_success, OutputFormat, TableDisplay};

/// Longest reason shown in a table cell
pub const MAX_REASON_CELL: usize = 160;

#[derive(Args)]
pub struct ExportArgs {
    /// Spec file, or a directory of `*.md` specs
    #[arg(required = true)]
    pub spec: PathBuf,

    /// Run to export from (defaults to the latest run)
    #[arg(long, env = "AUTOQA_RUN_ID")]
    pub run_id: Option<String>,

    /// Base URL the run was recorded against
    #[arg(long, env = "AUTOQA_BASE_URL")]
    pub base_url: String,

    /// Base URL of the login origin, when it differs
    #[arg(long, env = "AUTOQA_LOGIN_BASE_URL")]
    pub login_base_url: Option<String>,

    /// Export directory relative to the project root (overrides config)
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

/// One line of the export report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub spec: String,
    #[serde(flatten)]
    pub outcome: ExportOutcome,
}

impl TableDisplay for ExportRow {
    fn headers() -> Vec<&'static str> {
        vec!["Spec", "Status", "Output", "Reason"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.spec.clone(),
            if self.outcome.ok { "exported" } else { "failed" }.to_string(),
            self.outcome.relative_path.clone().unwrap_or_else(|| "-".to_string()),
            self.outcome
                .reason
                .as_deref()
                .map(|r| truncate_string(r, MAX_REASON_CELL))
                .unwrap_or_default(),
        ]
    }
}

/// Export every spec named by `args`; `Ok(false)` when any export failed
pub fn execute(
    args: ExportArgs,
    cwd: &Path,
    config: &AutoqaConfig,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    let specs = discover_specs(cwd, &args.spec)?;
    let run_id = resolve_run_id(cwd, args.run_id)?;
    let export_dir = args
        .export_dir
        .unwrap_or_else(|| config.export_dir().to_path_buf());

    debug!(
        run_id = %run_id,
        base_url = %redact_url_credentials(&args.base_url),
        specs = specs.len(),
        "Exporting specs"
    );

    let rows: Vec<ExportRow> = specs
        .into_iter()
        .map(|source| {
            let spec_path = spec_path_in_project(&source.path, cwd);
            let mut options = ExportOptions::new(cwd, &run_id, &spec_path, source.spec, &args.base_url)
                .with_raw_spec(source.raw)
                .with_export_dir(&export_dir);
            if let Some(url) = &args.login_base_url {
                options = options.with_login_base_url(url);
            }

            let spec = to_safe_relative_path(&source.path, cwd);
            let result = export_from_trace(&options);
            if let Err(err) = &result {
                warn!(spec = %spec, code = err.code(), "Export failed");
            }

            ExportRow {
                spec,
                outcome: ExportOutcome::from(&result),
            }
        })
        .collect();

    print_list(&rows, format);

    let failed = rows.iter().filter(|r| !r.outcome.ok).count();
    if format != OutputFormat::Json {
        if failed == 0 {
            print_success(&format!("Exported {} spec(s) from run {}", rows.len(), run_id));
        } else {
            print_error(&format!("{failed} of {} export(s) failed", rows.len()));
        }
    }

    Ok(failed == 0)
}
