//! AutoQA Common Library
//!
//! Shared types and helpers for the AutoQA exporter: the recorded action
//! model, read access to the per-run trace store, and path/redaction helpers
//! that keep absolute paths and secrets out of anything user-visible.

pub mod error;
pub mod paths;
pub mod redact;
pub mod trace;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use trace::TraceStore;
pub use types::*;

/// AutoQA version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project-local directory holding run artifacts
pub const AUTOQA_DIR: &str = ".autoqa";

/// Directory holding one sub-directory per run
pub fn runs_dir(cwd: &std::path::Path) -> std::path::PathBuf {
    cwd.join(AUTOQA_DIR).join("runs")
}
