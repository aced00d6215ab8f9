//! Typed error kinds for the diff engine.
//!
//! Call sites propagate these through `anyhow::Result` with `.context()`,
//! matching this crate's existing convention; a caller that needs to match on
//! a specific failure kind can `err.downcast_ref::<DiffError>()`.

use std::fmt;

#[derive(Debug)]
pub enum DiffError {
    Connection { message: String },
    DriverNotCompiledIn { scheme: String },
    QueryExecution { message: String },
    TableDoesNotExist { table: String },
    ColumnMissing { table: String, column: String },
    UnknownType { table: String, column: String, raw: String },
    IncompatibleTypes { column: String, left: String, right: String },
    KeyTypeMismatch { column: String },
    DuplicateKey { table: String, columns: Vec<String> },
    NullKey { table: String, columns: Vec<String> },
    EmptyTable { table: String },
    Overflow { message: String },
    InvalidKeyValue { value: String },
    Configuration { message: String },
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffError::Connection { message } => write!(f, "connection error: {message}"),
            DiffError::DriverNotCompiledIn { scheme } => {
                write!(f, "no driver compiled in for scheme `{scheme}://`")
            }
            DiffError::QueryExecution { message } => write!(f, "query execution failed: {message}"),
            DiffError::TableDoesNotExist { table } => write!(f, "table does not exist: {table}"),
            DiffError::ColumnMissing { table, column } => {
                write!(f, "column `{column}` missing from table `{table}`")
            }
            DiffError::UnknownType { table, column, raw } => {
                write!(f, "unknown column type `{raw}` for {table}.{column}")
            }
            DiffError::IncompatibleTypes { column, left, right } => write!(
                f,
                "incompatible types for column `{column}`: {left} vs {right}"
            ),
            DiffError::KeyTypeMismatch { column } => {
                write!(f, "key column `{column}` has mismatched key-type classes on each side")
            }
            DiffError::DuplicateKey { table, columns } => {
                write!(f, "duplicate key in table `{table}` over columns {columns:?}")
            }
            DiffError::NullKey { table, columns } => {
                write!(f, "null key in table `{table}` over columns {columns:?}")
            }
            DiffError::EmptyTable { table } => write!(f, "table `{table}` is empty"),
            DiffError::Overflow { message } => write!(f, "overflow: {message}"),
            DiffError::InvalidKeyValue { value } => write!(f, "invalid key value: {value:?}"),
            DiffError::Configuration { message } => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for DiffError {}
