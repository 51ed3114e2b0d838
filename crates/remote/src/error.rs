//! Remote Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A remote error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be built (bad base URL, TLS backend failure).
    #[display("invalid HTTP client configuration")]
    Client,
    /// Connection, timeout, or body transfer failure.
    #[display("network error")]
    Network,
    /// The server answered with a non-success status.
    #[display("unexpected HTTP status: {_0}")]
    Status(#[error(not(source))] u16),
    /// The metadata response could not be decoded.
    #[display("invalid manifest metadata response")]
    InvalidResponse,
    /// The metadata service answered, but with an error code of its own.
    #[display("manifest service error {_0}: {_1}")]
    Service(#[error(not(source))] i64, #[error(not(source))] String),
    /// The manifest has no database for the requested locale.
    #[display("no manifest database for locale: {_0}")]
    MissingLocale(#[error(not(source))] String),
    /// A remote path could not be joined onto the base URL.
    #[display("invalid remote path: {_0}")]
    InvalidPath(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}
