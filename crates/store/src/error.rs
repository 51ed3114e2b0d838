//! Store Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// [`NotFound`](Self::NotFound) is an expected negative answer,
/// [`Decode`](Self::Decode) means the requested type doesn't match the stored
/// data (wrong type for the table, or a newer manifest schema), everything
/// else is infrastructure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The database file is missing, unreadable, or not a database at all.
    #[display("cannot open manifest database: {}", _0.display())]
    Open(#[error(not(source))] PathBuf),
    /// The engine rejected or failed the query (missing table, I/O during read).
    #[display("database query error")]
    Query,
    /// Table name is not a plain SQL identifier and was never sent to the engine.
    #[display("invalid table name: {_0:?}")]
    InvalidTable(#[error(not(source))] String),
    /// No row with this key exists in the table.
    #[display("record not found: ({_0}, {_1})")]
    NotFound(#[error(not(source))] String, #[error(not(source))] u32),
    /// A stored record could not be decoded into the requested type.
    #[display("record in {_0} does not match the requested type")]
    Decode(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns `true` for an absent record, as opposed to a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ErrorKind::NotFound(..))
    }
}
