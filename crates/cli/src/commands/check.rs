//! Check whether recorded runs can be exported

use std::path::{Path, PathBuf};

use autoqa_common::paths::to_safe_relative_path;
use autoqa_common::redact::truncate_string;
use autoqa_export::{check_exportable, Exportability};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::export::MAX_REASON_CELL;
use super::{discover_specs, resolve_run_id, spec_path_in_project};
use crate::output::{print_list, print_warning, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct CheckArgs {
    /// Spec file, or a directory of `*.md` specs
    #[arg(required = true)]
    pub spec: PathBuf,

    /// Run to check (defaults to the latest run)
    #[arg(long, env = "AUTOQA_RUN_ID")]
    pub run_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRow {
    pub spec: String,
    #[serde(flatten)]
    pub result: Exportability,
}

impl TableDisplay for CheckRow {
    fn headers() -> Vec<&'static str> {
        vec!["Spec", "Exportable", "Code", "Reason"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.spec.clone(),
            if self.result.exportable { "yes" } else { "no" }.to_string(),
            self.result.code.unwrap_or("-").to_string(),
            self.result
                .reason
                .as_deref()
                .map(|r| truncate_string(r, MAX_REASON_CELL))
                .unwrap_or_default(),
        ]
    }
}

/// Report exportability without writing; `Ok(false)` when any spec is not exportable
pub fn execute(args: CheckArgs, cwd: &Path, format: OutputFormat) -> anyhow::Result<bool> {
    let specs = discover_specs(cwd, &args.spec)?;
    let run_id = resolve_run_id(cwd, args.run_id)?;

    let rows: Vec<CheckRow> = specs
        .iter()
        .map(|source| CheckRow {
            spec: to_safe_relative_path(&source.path, cwd),
            result: check_exportable(cwd, &run_id, &spec_path_in_project(&source.path, cwd)),
        })
        .collect();

    print_list(&rows, format);

    if format == OutputFormat::Table {
        for row in rows.iter().filter(|r| !r.result.missing_locators.is_empty()) {
            println!();
            println!("{}", row.spec.bold());
            for missing in &row.result.missing_locators {
                println!("  {} {}", "missing locator:".red(), missing);
            }
        }
    }

    let blocked = rows.iter().filter(|r| !r.result.exportable).count();
    if blocked > 0 && format != OutputFormat::Json {
        print_warning(&format!("{blocked} spec(s) cannot be exported from run {run_id}"));
    }

    Ok(blocked == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_row_cells() {
        let row = CheckRow {
            spec: "specs/a.md".to_string(),
            result: Exportability {
                exportable: false,
                reason: Some("No IR records found for spec".to_string()),
                code: Some("NO_IR_RECORDS"),
                missing_locators: Vec::new(),
            },
        };
        assert_eq!(
            row.row(),
            vec!["specs/a.md", "no", "NO_IR_RECORDS", "No IR records found for spec"]
        );
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["exportable"], false);
        assert!(json.get("missingLocators").is_none());
    }
}
