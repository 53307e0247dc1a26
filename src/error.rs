//! Error types for the prediction filtering and network library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum MirnaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid {name} threshold '{value}': not a number")]
    InvalidThreshold { name: &'static str, value: String },

    #[error("Missing column '{0}' in prediction table")]
    MissingColumn(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error(
        "Too many entities: {genes} genes x {mirnas} miRNAs exceeds the ceiling of {limit} matrix cells"
    )]
    TooManyEntities {
        genes: usize,
        mirnas: usize,
        limit: usize,
    },

    #[error("Non-numeric value '{value}' in column '{column}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Missing identifier in column '{column}' at row {row}")]
    MissingIdentifier { column: String, row: usize },

    #[error("Row {row} has {actual} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, MirnaError>;
