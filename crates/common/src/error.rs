//! Error types for AutoQA

use thiserror::Error;

/// Result type alias using AutoQA Error
pub type Result<T> = std::result::Result<T, Error>;

/// AutoQA error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed trace record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}
