//! Archive Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive must hold exactly one file entry. Don't retry with the same input.
    #[display("expected exactly one archive entry, found {_0}")]
    EntryCount(#[error(not(source))] usize),
    /// Archive is corrupt or malformed (bad central directory, checksum
    /// mismatch, unsupported compression method).
    #[display("invalid or corrupted archive")]
    InvalidData,
    /// Something already occupies the destination path.
    #[display("destination already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Creating, writing or renaming the output file failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }

    /// Returns `true` if the archive itself is unusable, as opposed to the
    /// local filesystem refusing the output.
    pub fn is_format(&self) -> bool {
        matches!(self, ErrorKind::EntryCount(_) | ErrorKind::InvalidData)
    }
}
