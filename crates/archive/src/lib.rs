//! Extraction of single-entry ZIP archives.
//!
//! The manifest database is published as a ZIP archive holding exactly one
//! file. This crate turns such an archive into that one file on disk:
//!
//! - **Entry count** is checked before anything is written; an archive with
//!   zero or several entries is refused outright.
//! - **Streaming** decompression straight from the archive reader into the
//!   output file, without buffering the entry in memory.
//! - **Atomic placement**: the entry is written under a temporary name in the
//!   destination directory and renamed into place only when complete, so a
//!   crash or error mid-copy never leaves a truncated file where a complete
//!   one is expected.
//!
//! Everything here is synchronous; async callers should hand it to a
//! blocking thread.
//!
//! Temporary files are removed on every error path, but a process killed
//! mid-extraction leaves its dot-prefixed `.partial` file behind. Nothing
//! cleans these up; they never match a final name.

pub mod error;
mod extract;

pub use crate::extract::{extract_single, extract_single_from_slice};
