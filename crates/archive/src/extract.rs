//! Extraction Operations

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;
use tempfile::{Builder as TempBuilder, NamedTempFile, PersistError};
use tracing::instrument;
use zip::ZipArchive;

const PARTIAL_PREFIX: &str = ".";
const PARTIAL_SUFFIX: &str = ".partial";

/// Extract the one and only entry of a ZIP archive into a new file at
/// `destination`.
///
/// The entry is streamed into a temporary file next to `destination` and
/// only renamed into place once fully written and synced, so an interrupted
/// extraction never leaves a truncated file at `destination`. The rename
/// refuses to replace anything already at `destination`.
///
/// Returns the number of decompressed bytes written.
///
/// # Errors
///
/// - [`ErrorKind::EntryCount`] if the archive holds zero or several entries
///   (nothing is written).
/// - [`ErrorKind::InvalidData`] if the archive or its entry is corrupt.
/// - [`ErrorKind::AlreadyExists`] if `destination` is already taken.
/// - [`ErrorKind::Io`] for any other filesystem failure.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
///
/// let archive = File::open("world_sql_content.content.zip").unwrap();
/// let bytes = manifest_archive::extract_single(archive, "world_sql_content.content").unwrap();
/// assert!(bytes > 0);
/// ```
pub fn extract_single<R: Read + Seek>(archive: R, destination: impl AsRef<Path>) -> Result<u64> {
    extract_single_inner(archive, destination.as_ref())
}

/// Same as [`extract_single`], for an archive already held in memory (for
/// example a downloaded response body).
pub fn extract_single_from_slice(archive: &[u8], destination: impl AsRef<Path>) -> Result<u64> {
    extract_single_inner(Cursor::new(archive), destination.as_ref())
}

#[instrument(skip(archive), fields(destination = %destination.display(), entries, written))]
fn extract_single_inner<R: Read + Seek>(archive: R, destination: &Path) -> Result<u64> {
    let mut archive = ZipArchive::new(archive).or_raise(|| ErrorKind::InvalidData)?;
    tracing::Span::current().record("entries", archive.len());
    if archive.len() != 1 {
        exn::bail!(ErrorKind::EntryCount(archive.len()));
    }
    let mut entry = archive.by_index(0).or_raise(|| ErrorKind::InvalidData)?;
    // A lone directory entry has nothing to extract.
    if entry.is_dir() {
        exn::bail!(ErrorKind::EntryCount(0));
    }

    let mut partial = partial_file_for(destination)?;
    let written = match io::copy(&mut entry, &mut partial) {
        Ok(written) => written,
        // Checksum mismatches and truncated deflate streams surface as these.
        Err(e) if matches!(e.kind(), io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof) => {
            return Err(e).or_raise(|| ErrorKind::InvalidData);
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
    };
    partial.flush().or_raise(|| ErrorKind::Io)?;
    partial.as_file().sync_all().or_raise(|| ErrorKind::Io)?;

    if let Err(PersistError { error, file }) = partial.persist_noclobber(destination) {
        // The error hands the temporary file back; remove it before returning.
        drop(file);
        let kind = match error.kind() {
            io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(destination.to_path_buf()),
            _ => ErrorKind::Io,
        };
        return Err(error).or_raise(|| kind);
    }
    tracing::Span::current().record("written", written);
    tracing::debug!(bytes = written, "Archive entry extracted");
    Ok(written)
}

/// Temporary file in the same directory as `destination`, so that the final
/// rename never crosses a filesystem boundary.
fn partial_file_for(destination: &Path) -> Result<NamedTempFile> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    TempBuilder::new().prefix(PARTIAL_PREFIX).suffix(PARTIAL_SUFFIX).tempfile_in(dir).or_raise(|| ErrorKind::Io)
}
