//! Error types shared by every layer of the engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur while manipulating tables, storage or commands.
#[derive(Debug, Error)]
pub enum DbError {
    /// A table with this name is already registered.
    #[error("table {0:?} already exists")]
    TableAlreadyExists(String),

    /// No table with this name is registered.
    #[error("table {0:?} not found")]
    TableNotFound(String),

    /// The column does not belong to the table.
    #[error("column {column:?} not found in table {table:?}")]
    ColumnNotFound { table: String, column: String },

    /// The column name is already used by the table.
    #[error("column {column:?} already exists in table {table:?}")]
    DuplicateColumn { table: String, column: String },

    /// The schema definition is inconsistent.
    #[error("invalid schema for table {table:?}: {reason}")]
    SchemaError { table: String, reason: String },

    /// Number of values does not match the number of columns.
    #[error("table {table:?} expects {expected} values, got {found}")]
    ArityMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// A value has the wrong kind for the accessor or the column.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Row index past the end of the table.
    #[error("row index {index} out of range for table {table:?} with {len} rows")]
    IndexOutOfRange {
        table: String,
        index: usize,
        len: usize,
    },

    /// The command could not be parsed.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Reading or writing a table file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One or more tables could not be written by a bulk persist.
    #[error("failed to persist tables {tables:?}: {first}")]
    PersistFailed {
        /// Every table whose write failed, in name order.
        tables: Vec<String>,
        /// The error of the first failing table.
        #[source]
        first: Box<DbError>,
    },

    /// A persisted table file has corrupt content.
    #[error("malformed data for table {table:?} at line {line}: {reason}")]
    MalformedPersistedData {
        table: String,
        line: usize,
        reason: String,
    },
}

impl DbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DbError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn column_not_found(table: &str, column: &str) -> Self {
        DbError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
