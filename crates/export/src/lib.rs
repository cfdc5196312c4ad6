//! AutoQA trace exporter
//!
//! Compiles the action trace recorded while an agent ran a Markdown spec into
//! a standalone Playwright test file:
//! - Reads the run's `ir.jsonl` records for one spec
//! - Refuses element actions without a validated locator
//! - Generates one code fragment per record, dispatched on the tool name
//! - Recovers `{{VAR}}` placeholders from the raw spec so secrets are read
//!   from the environment instead of being embedded
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 export_from_trace(options)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TraceStore::records_for_spec() -> Vec<ActionRecord>        │
//! │  validate_records()            -> MISSING_LOCATOR, ...      │
//! │  aggregate(spec, records)                                   │
//! │    ├── playwright::generate(record, ctx) -> Fragment        │
//! │    ├── template::template_expression(raw)                   │
//! │    └── naming::dedupe_fragment(code, registry)              │
//! │  emit::render_test_file(plan) -> String                     │
//! │  write <exportDir>/<spec>.spec.ts                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod aggregate;
pub mod emit;
pub mod error;
pub mod export;
pub mod naming;
pub mod paths;
pub mod playwright;
pub mod spec_source;
pub mod template;

pub use error::{CodegenError, ExportError, ExportResult, MissingLocator};
pub use export::{
    check_exportable, compile, export_from_trace, missing_locators, Exportability, ExportOptions,
    ExportOutcome, ExportSuccess,
};
pub use spec_source::{parse_markdown_spec, SpecSource};
pub use template::{parse_raw_spec_vars, StepVarInfo};
