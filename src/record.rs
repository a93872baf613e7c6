//! Delimited record splitting and per-record errors.
//!
//! Both jobs read pipe-delimited lines. Splitting discards trailing empty
//! fields, so `a|b||` has two fields and a line made only of delimiters has
//! none. A line without any delimiter is a single field, even when empty.

use crate::engine::Counter;
use std::num::ParseIntError;
use thiserror::Error;

/// Field separator used by every input format.
pub const FIELD_DELIMITER: char = '|';

/// Split a line into its `|`-separated fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() > 1 {
        while fields.last() == Some(&"") {
            fields.pop();
        }
    }
    fields
}

/// Why a single input record could not be turned into map output.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected exactly {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("invalid timestamp {value:?} in {field}")]
    Timestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid integer {value:?} in {field}")]
    Integer {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl RecordError {
    /// Counter incremented when the record is skipped.
    ///
    /// `None` means the error is fatal and fails the whole job.
    pub fn counter(&self) -> Option<Counter> {
        match self {
            Self::FieldCount { .. } | Self::TooFewFields { .. } => Some(Counter::InvalidRecordCount),
            Self::Timestamp { .. } => Some(Counter::MalformedTimestampCount),
            Self::Integer { .. } => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.counter().is_none()
    }
}
