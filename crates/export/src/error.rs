//! Error types for trace export

use std::fmt;

use autoqa_common::{ActionRecord, ToolName};
use serde::Serialize;
use thiserror::Error;

/// An element-targeting action recorded without a usable locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingLocator {
    pub tool_name: ToolName,
    pub step_index: Option<u32>,
}

impl MissingLocator {
    pub fn from_record(record: &ActionRecord) -> Self {
        Self {
            tool_name: record.tool_name.clone(),
            step_index: record.step_index,
        }
    }
}

impl fmt::Display for MissingLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step_index {
            Some(step) => write!(f, "{} at step {}", self.tool_name, step),
            None => write!(f, "{} at unknown step", self.tool_name),
        }
    }
}

/// A generator lacked data it needs for one record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Step {}: {tool_name} {message}", step_label(*.step_index))]
pub struct CodegenError {
    pub step_index: Option<u32>,
    pub tool_name: ToolName,
    pub message: String,
}

impl CodegenError {
    pub fn new(record: &ActionRecord, message: impl Into<String>) -> Self {
        Self {
            step_index: record.step_index,
            tool_name: record.tool_name.clone(),
            message: message.into(),
        }
    }
}

pub(crate) fn step_label(step_index: Option<u32>) -> String {
    step_index.map_or_else(|| "?".to_string(), |i| i.to_string())
}

fn join_display<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reasons an export is rejected. No file is written for any of them.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to read IR file: {0}")]
    TraceRead(#[source] autoqa_common::Error),

    #[error("No IR records found for spec")]
    NoRecords,

    #[error("{} action(s) missing valid chosenLocator: {}", .0.len(), join_display(.0))]
    MissingLocators(Vec<MissingLocator>),

    #[error("Code generation failed: {}", join_display(.0))]
    Codegen(Vec<CodegenError>),

    #[error("Failed to {action}: {source}")]
    Write {
        action: &'static str,
        source: std::io::Error,
    },
}

impl ExportError {
    /// Stable failure code
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::TraceRead(_) => "IR_READ_FAILED",
            ExportError::NoRecords => "NO_IR_RECORDS",
            ExportError::MissingLocators(_) => "MISSING_LOCATOR",
            ExportError::Codegen(_) => "CODEGEN_ERROR",
            ExportError::Write { .. } => "WRITE_FAILED",
        }
    }

    /// Human-readable reason, safe to print
    pub fn reason(&self) -> String {
        format!("Export failed: {self}")
    }

    /// Every offending action when the export failed on missing locators
    pub fn missing_locators(&self) -> Option<&[MissingLocator]> {
        match self {
            ExportError::MissingLocators(missing) => Some(missing),
            _ => None,
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
