//! Record sources feeding the calculator.
//!
//! A source is re-read on every computation request. Sources parse and
//! convert values only; ordering and range checks belong to the calculator.

mod csv;

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::PeriodRecord;
use crate::error::ErrorCode;

pub use csv::{CsvRecordSource, write_records};

/// Errors raised while loading records.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the source.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source has no header row.
    #[error("{path}: missing header row")]
    MissingHeader {
        /// Path of the source.
        path: PathBuf,
    },

    /// A required column is absent from the header.
    #[error("{path}: missing required column '{column}'")]
    MissingColumn {
        /// Path of the source.
        path: PathBuf,
        /// Name of the missing column.
        column: String,
    },

    /// A field could not be parsed.
    #[error("line {line}, column '{column}': {message}")]
    Parse {
        /// 1-based line number in the file.
        line: usize,
        /// Column name.
        column: String,
        /// What went wrong.
        message: String,
    },
}

impl SourceError {
    /// Error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::SourceUnavailable,
            Self::MissingHeader { .. } | Self::MissingColumn { .. } | Self::Parse { .. } => {
                ErrorCode::MalformedSource
            }
        }
    }
}

/// A provider of period records.
pub trait RecordSource: Send + Sync {
    /// Load the full record sequence.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` when the source cannot be read or parsed.
    fn load(&self) -> Result<Vec<PeriodRecord>, SourceError>;

    /// Human-readable description of the source, used in logs.
    fn describe(&self) -> String;
}
