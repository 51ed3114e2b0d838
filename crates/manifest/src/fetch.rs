//! Download-and-unpack of the manifest archive.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use manifest_remote::{HttpClient, Url};
use std::path::Path;
use tokio::task;
use tracing::instrument;

/// Downloads a manifest archive and extracts its single entry into place.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveFetcher<'a> {
    client: &'a HttpClient,
}
impl<'a> ArchiveFetcher<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Fetch `url` and write its sole archive entry to `destination`.
    ///
    /// On success `destination` holds exactly the entry's decompressed bytes.
    /// On failure nothing is left at `destination`: a bad status is refused
    /// before extraction, and extraction itself only ever renames a complete
    /// file into place.
    ///
    /// Returns the number of bytes written.
    #[instrument(skip_all, fields(url = %url, destination = %destination.display()))]
    pub async fn fetch(&self, url: &Url, destination: &Path) -> Result<u64> {
        tracing::info!("Downloading the manifest database");
        let archive = self.client.download(url).await.map_err(ErrorKind::remote)?;
        let destination = destination.to_path_buf();
        // Extraction is synchronous file I/O; keep it off the async worker.
        let written = task::spawn_blocking(move || manifest_archive::extract_single_from_slice(&archive, &destination))
            .await
            .or_raise(|| ErrorKind::Io)?
            .map_err(ErrorKind::archive)?;
        tracing::debug!(bytes = written, "Manifest database extracted");
        Ok(written)
    }
}
