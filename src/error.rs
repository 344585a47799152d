//! Unified error type for the dotkv library.
//!
//! Every fallible operation in the crate returns [`Result`], so callers can
//! use `?` across the utility functions, the in-memory store and the
//! fjall-backed [`Database`](crate::Database) alike.

use thiserror::Error;

use crate::types::ValueType;
use crate::util::PathError;

/// Error type for all dotkv operations.
///
/// # Example
///
/// ```ignore
/// use dotkv::{Database, Result};
///
/// fn bump(db: &Database) -> Result<()> {
///     db.add("stats.visits", 1.0)?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the underlying document store.
    #[cfg(feature = "store")]
    #[error("Store error: {0}")]
    Store(#[from] fjall::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed nested path.
    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    #[error("Invalid key specified: {0:?}")]
    InvalidKey(String),

    #[error("Invalid table name: {0:?}")]
    InvalidTable(String),

    /// A nested path was written to or removed from a value that is neither
    /// an object nor an array.
    #[error("Cannot target non-object: {0}")]
    TargetNotObject(String),

    #[error("Target is not an array: {0}")]
    NotAnArray(String),

    #[error("Expected existing data at '{key}' to be a number, found {found}")]
    NotANumber { key: String, found: ValueType },

    #[error("Unknown math operator: {0:?}")]
    InvalidOperator(String),

    /// Operand or result cannot be stored as a JSON number.
    #[error("Invalid number: {0}")]
    InvalidNumber(f64),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Database is not connected")]
    NotConnected,

    #[error("Invalid connection url: {0:?}")]
    InvalidUrl(String),

    /// A record was rejected during import.
    #[error("Import rejected: {0}")]
    Import(String),
}

/// A [`Result`] type alias using the crate [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if the operation needed a connection and none was open.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }

    /// Returns `true` if the caller supplied a bad key, path, table, operator or number.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Path(_)
                | Self::InvalidKey(_)
                | Self::InvalidTable(_)
                | Self::InvalidOperator(_)
                | Self::InvalidNumber(_)
                | Self::DivisionByZero
                | Self::InvalidUrl(_)
        )
    }

    /// Returns `true` if the stored value has the wrong shape for the operation.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            Self::TargetNotObject(_) | Self::NotAnArray(_) | Self::NotANumber { .. }
        )
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
