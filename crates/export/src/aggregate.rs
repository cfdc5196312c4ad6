//! Step aggregation: records grouped per spec step, generated and deduplicated

use std::collections::{BTreeMap, BTreeSet};

use autoqa_common::{ActionRecord, MarkdownSpec};
use tracing::{debug, warn};

use crate::error::CodegenError;
use crate::naming::{dedupe_fragment, NameRegistry};
use crate::playwright::{generate, GenContext, Needs};
use crate::template::{ident_for_var, redact_step_text, StepVarInfo};

/// Generated code for one spec step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCode {
    pub index: u32,
    /// Redacted step text, single line
    pub comment: String,
    /// Indented statements, one fragment per line group
    pub body: String,
}

impl StepCode {
    /// Comment line followed by the body
    pub fn render(&self) -> String {
        format!("  // Step {}: {}\n{}", self.index, self.comment, self.body)
    }
}

/// Everything the emitter needs to write a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPlan {
    pub steps: Vec<StepCode>,
    /// Variables to declare, sorted by name
    pub env_vars: BTreeSet<String>,
    pub login_base_url: bool,
}

struct PendingStep {
    index: u32,
    comment: String,
    fragments: Vec<String>,
}

/// Generate code for every step of `spec` from its `ok` records.
///
/// All code generation errors are collected before returning. Names are
/// deduplicated once over the whole file, in file order.
pub fn aggregate(
    spec: &MarkdownSpec,
    records: &[ActionRecord],
    step_vars: &BTreeMap<u32, StepVarInfo>,
    base: GenContext<'_>,
) -> Result<StepPlan, Vec<CodegenError>> {
    for record in records {
        if let Some(index) = record.step_index {
            if spec.step(index).is_none() {
                warn!(step_index = index, tool = %record.tool_name, "Skipping record for unknown step");
            }
        }
    }

    let mut errors = Vec::new();
    let mut needs = Needs::default();
    let mut idents: BTreeMap<String, String> = BTreeMap::new();
    let mut pending = Vec::with_capacity(spec.steps.len());

    for step in &spec.steps {
        let ctx = base.with_step_vars(step_vars.get(&step.index));
        let comment = redact_step_text(&step.text, &ctx);

        let step_records: Vec<&ActionRecord> = records
            .iter()
            .filter(|r| r.is_ok() && r.step_index == Some(step.index))
            .collect();

        if step_records.is_empty() {
            debug!(step = step.index, "No records for step");
            pending.push(PendingStep {
                index: step.index,
                fragments: vec![format!(
                    "  // TODO: Step {} - No IR record found for: {}",
                    step.index, comment
                )],
                comment,
            });
            continue;
        }

        let mut fragments = Vec::with_capacity(step_records.len());
        for record in step_records {
            match generate(record, &ctx) {
                Ok(fragment) => {
                    for name in &fragment.needs.env_vars {
                        let ident = ident_for_var(name);
                        match idents.get(&ident) {
                            Some(existing) if existing != name => errors.push(CodegenError::new(
                                record,
                                format!("variables {existing} and {name} map to the same identifier '{ident}'"),
                            )),
                            _ => {
                                idents.insert(ident, name.clone());
                            }
                        }
                    }
                    if !fragment.is_empty() {
                        fragments.push(fragment.code);
                    }
                    needs.merge(fragment.needs);
                }
                Err(err) => errors.push(err),
            }
        }

        pending.push(PendingStep {
            index: step.index,
            comment,
            fragments,
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut registry = NameRegistry::seeded(idents.into_keys());
    let steps = pending
        .into_iter()
        .filter(|step| !step.fragments.is_empty())
        .map(|step| StepCode {
            index: step.index,
            body: step
                .fragments
                .iter()
                .map(|fragment| dedupe_fragment(fragment, &mut registry))
                .collect::<Vec<_>>()
                .join("\n"),
            comment: step.comment,
        })
        .collect();

    Ok(StepPlan {
        steps,
        env_vars: needs.env_vars,
        login_base_url: needs.login_base_url,
    })
}
