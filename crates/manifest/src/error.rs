//! Manifest Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Errors from the lower crates are re-raised here as the
//! kind the caller needs to act on, with the original kept as a child frame.

use derive_more::{Display, Error};
use manifest_archive::error::Error as ArchiveError;
use manifest_remote::error::{Error as RemoteError, ErrorKind as RemoteErrorKind};

/// A manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for opening the manifest.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration is unusable.
    #[display("invalid configuration")]
    Config,
    /// The metadata service answered, but not with a usable manifest location.
    #[display("manifest metadata unusable")]
    Metadata,
    /// Transport failure or non-success HTTP status.
    #[display("network error")]
    Network,
    /// The downloaded archive isn't a ZIP holding exactly one database.
    #[display("malformed manifest archive")]
    ArchiveFormat,
    /// Local file create, write or rename failed.
    #[display("I/O error")]
    Io,
    /// The local database file could not be opened.
    #[display("cannot open manifest database")]
    Open,
}

impl ErrorKind {
    /// Re-raise a metadata or download error, keeping network trouble apart
    /// from answers that can't be used.
    #[track_caller]
    pub fn remote(err: RemoteError) -> Error {
        let kind = match &*err {
            RemoteErrorKind::Client | RemoteErrorKind::Network | RemoteErrorKind::Status(_) => Self::Network,
            RemoteErrorKind::InvalidResponse
            | RemoteErrorKind::Service(..)
            | RemoteErrorKind::MissingLocale(_)
            | RemoteErrorKind::InvalidPath(_) => Self::Metadata,
        };
        err.raise(kind)
    }

    /// Re-raise an extraction error as either a bad archive or a local I/O
    /// failure.
    #[track_caller]
    pub fn archive(err: ArchiveError) -> Error {
        let kind = if err.is_format() { Self::ArchiveFormat } else { Self::Io };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Io)
    }
}
