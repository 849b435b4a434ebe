//! FILENAME: datatable/src/error.rs

use thiserror::Error;

use crate::value::ColumnType;

/// The axis an index refers to, for out-of-range diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Errors raised by the data engine. All are raised synchronously at the
/// point of violation; batch operations validate before mutating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("{axis} index {index} out of range (length {len})")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ColumnType, found: String },

    #[error("invalid column type: {0}")]
    InvalidType(String),

    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("unsupported aggregation: {0}")]
    UnsupportedAggregation(String),

    #[error("duplicate column id: {0}")]
    DuplicateColumnId(String),
}

impl DataError {
    /// Shorthand for a row index violation.
    pub fn row_out_of_range(index: usize, len: usize) -> Self {
        DataError::IndexOutOfRange { axis: Axis::Row, index, len }
    }

    /// Shorthand for a column index violation.
    pub fn column_out_of_range(index: usize, len: usize) -> Self {
        DataError::IndexOutOfRange { axis: Axis::Column, index, len }
    }
}

/// Convenience alias used throughout the engine crates.
pub type DataResult<T> = Result<T, DataError>;
