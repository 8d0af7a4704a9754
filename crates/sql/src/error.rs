//! Error types for the SQL engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // SQL errors
    #[error("SQL parse error: {0}")]
    ParseError(String),

    // Schema errors
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    DuplicateTable(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    // Query shape errors
    #[error("Subquery returns more than 1 {0}")]
    SubqueryArity(String),

    #[error("The used SELECT statements have a different number of columns")]
    SetOperationArity,

    // Constraint errors
    #[error("Duplicate entry '{value}' for key '{key}'")]
    UniqueConstraintViolation { key: String, value: String },

    #[error("Column '{0}' cannot be null")]
    NullConstraintViolation(String),

    #[error("Field '{0}' doesn't have a default value")]
    MissingDefault(String),

    #[error("Out of range value for column '{column}': {value}")]
    OutOfRange { column: String, value: String },

    #[error("Data too long for column '{0}'")]
    DataTooLong(String),

    // Value errors
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("No value bound for parameter {0}")]
    UnboundParameter(String),

    // Statement errors
    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl Error {
    /// Whether the error was raised before execution started
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::ParseError(_))
    }
}
