use std::io;

use thiserror::Error;

/// Errors that can occur while resolving headers or reading records.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("No header row found at offset {offset}")]
    MissingHeader { offset: usize },
    #[error("Invalid header: {reason}")]
    InvalidHeader { reason: String },
    #[error("Header offset must be a non-negative integer, got {0}")]
    InvalidOffset(i64),
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("Failed to open file: {0}")]
    FileOpen(#[from] io::Error),
    #[error("Failed to parse CSV record: {0}")]
    CsvParse(#[from] csv::Error),
    #[error("Invalid UTF-8 in row {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReaderError {
    pub(crate) fn invalid_header(reason: impl Into<String>) -> Self {
        Self::InvalidHeader {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
