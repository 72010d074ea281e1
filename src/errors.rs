use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::FieldType;

/// Error type for the arithmetic and statistics primitives.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathError {
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("cannot compute over an empty dataset")]
    EmptyInput,
    #[error("requires at least two data points, got {0}")]
    InsufficientData(usize),
    #[error("operation undefined over the reals: {0}")]
    InvalidOperation(String),
}

/// Reason a record failed validation. Ordering of the variants mirrors the
/// order in which the checks run; the first failure wins.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid type for '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: &'static str,
        expected: FieldType,
        actual: FieldType,
    },
    #[error("value {0} out of reasonable range (-1000 to 10000)")]
    OutOfRange(f64),
    #[error("timestamp {0} is in the future")]
    FutureTimestamp(DateTime<Utc>),
}

/// Reason a record was dropped before it ever reached validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing essential field 'id' or 'value'")]
    MissingEssentialField,
    #[error("invalid numeric format for '{field}': {value:?}")]
    InvalidNumericFormat { field: &'static str, value: String },
    #[error("invalid timestamp format: {value:?}")]
    InvalidTimestamp { value: String },
}
