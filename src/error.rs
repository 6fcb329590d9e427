//! Error handling for IGRA archive parsing and station extraction.
//!
//! Provides error types with enough context (file path, line number, field
//! name) to locate a bad record in a multi-megabyte archive.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IgraError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid archive container: {path} - {reason}")]
    InvalidContainer { path: PathBuf, reason: String },

    #[error("Archive is not valid UTF-8 text: {path}")]
    InvalidEncoding { path: PathBuf },

    #[error("Malformed record at line {line}, field {field}: {reason}")]
    MalformedRecord {
        line: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Invalid sounding time '{value}' at line {line}: {source}")]
    InvalidTimestamp {
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Value {value} does not fit in the {width}-column field {field}")]
    FieldOverflow {
        field: &'static str,
        value: i64,
        width: usize,
    },

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

impl IgraError {
    /// Create a malformed-record error for a field on a given line
    pub fn malformed(line: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            field,
            reason: reason.into(),
        }
    }

    /// Create a container error for an archive path
    pub fn container(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidContainer {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IgraError>;
