//! Acquire-once, read-many access to the Destiny manifest.
//!
//! The manifest is a versioned SQLite database, published as a ZIP archive
//! holding that one file. Opening it goes:
//!
//! 1. Ask the metadata service ([`ManifestSource`]) where the current
//!    database for the configured locale lives.
//! 2. Derive the local file name from that remote path ([`CacheResolver`]).
//!    If a file by that name is already in the cache directory, use it.
//! 3. Otherwise download the archive and extract its entry to that name
//!    ([`ArchiveFetcher`]).
//! 4. Open the file read-only ([`Store`]) and serve typed lookups from it.
//!
//! # Limitations
//! - A cached file is trusted by name alone; stale copies are never
//!   refreshed, and downloads are not checksummed.
//! - Two processes opening the manifest for the first time at once will both
//!   download it. The loser's rename fails with [`ErrorKind::Io`] and the
//!   winner's file is left intact. Serialise first opens externally if that
//!   matters.
//! - No retries: every failure is reported immediately.
//! - A crash mid-extraction can leave a hidden `.partial` file in the cache
//!   directory. It is never mistaken for a database and is not cleaned up.
//!
//! # Examples
//!
//! ```no_run
//! use manifest::{Config, Manifest};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ClassDefinition {
//!     hash: u32,
//! }
//!
//! # async fn example() {
//! let config = Config::load(None).unwrap();
//! let manifest = Manifest::open(&config).await.unwrap();
//! let titan: ClassDefinition = manifest.get("DestinyClassDefinition", 3_655_393_761).await.unwrap();
//! let classes: Vec<ClassDefinition> = manifest.get_all("DestinyClassDefinition").await.unwrap();
//! assert!(classes.iter().any(|class| class.hash == titan.hash));
//! # }
//! ```

pub mod error;
mod fetch;
mod resolve;

pub use crate::fetch::ArchiveFetcher;
pub use crate::resolve::{CacheResolver, Resolution, cache_filename};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
pub use manifest_config::Config;
pub use manifest_remote::{HttpClient, MANIFEST_ENDPOINT, ManifestDescriptor, ManifestSource, StaticSource};
pub use manifest_store::error::{Error as StoreError, ErrorKind as StoreErrorKind};
pub use manifest_store::{Accessor, Store, row_id};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::instrument;

/// An opened manifest database.
#[derive(Debug, Clone)]
pub struct Manifest {
    store: Store,
    version: String,
}

impl Manifest {
    /// Open the current manifest described by the metadata service at
    /// `config.base_url`, downloading it first if it isn't cached.
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate().or_raise(|| ErrorKind::Config)?;
        let client =
            HttpClient::new(&config.base_url, config.api_key.clone(), config.timeout()).or_raise(|| ErrorKind::Config)?;
        Self::open_with(&client, &client, config).await
    }

    /// Open the manifest described by `source`, downloading through `client`.
    ///
    /// Uses `config.locale` and `config.cache_dir`; the client's own base URL
    /// and timeout apply to the download.
    #[instrument(skip_all, fields(locale = %config.locale, cache_dir = %config.cache_dir.display()))]
    pub async fn open_with(source: &dyn ManifestSource, client: &HttpClient, config: &Config) -> Result<Self> {
        let descriptor = source.descriptor().await.map_err(ErrorKind::remote)?;
        let path = match CacheResolver::new(&config.cache_dir).resolve(&descriptor, &config.locale).await? {
            Resolution::Cached(path) => {
                tracing::info!(path = %path.display(), "Using cached manifest database");
                path
            },
            Resolution::Fetch { remote_path, destination } => {
                let url = client.url(&remote_path).map_err(ErrorKind::remote)?;
                ArchiveFetcher::new(client).fetch(&url, &destination).await?;
                destination
            },
        };
        let store = Store::open(&path).await.or_raise(|| ErrorKind::Open)?;
        Ok(Self { store, version: descriptor.version })
    }

    /// Version string of the opened manifest, as reported by the metadata service.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Local database file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// See [`Accessor::get`].
    pub async fn get<T: DeserializeOwned>(&self, table: &str, hash: u32) -> manifest_store::error::Result<T> {
        self.store.accessor().get(table, hash).await
    }

    /// See [`Accessor::get_all`].
    pub async fn get_all<T: DeserializeOwned>(&self, table: &str) -> manifest_store::error::Result<Vec<T>> {
        self.store.accessor().get_all(table).await
    }
}
