//! Deciding between the local cache and a fresh download.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use manifest_remote::ManifestDescriptor;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// Local file name for a remote database path: its final path segment.
///
/// The publisher names every database after its content, so the same remote
/// path always maps to the same local name and a changed manifest always maps
/// to a new one.
pub fn cache_filename(remote_path: &str) -> Result<&str> {
    let name = remote_path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        exn::bail!(ErrorKind::Metadata);
    }
    Ok(name)
}

/// What the open sequence has to do to get a local database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file with the expected name is already present; use it as-is.
    Cached(PathBuf),
    /// Nothing local yet: download `remote_path` and extract it to `destination`.
    Fetch { remote_path: String, destination: PathBuf },
}

/// Maps manifest descriptors onto files in a cache directory.
///
/// A file with the right name is trusted without looking inside it. This
/// relies on downloads never leaving a partial file under the final name.
#[derive(Debug, Clone)]
pub struct CacheResolver {
    cache_dir: PathBuf,
}
impl CacheResolver {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into() }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Work out where the database for `locale` lives locally, and whether it
    /// still needs fetching. Creates the cache directory if needed.
    #[instrument(skip(self, descriptor), fields(version = %descriptor.version))]
    pub async fn resolve(&self, descriptor: &ManifestDescriptor, locale: &str) -> Result<Resolution> {
        let remote_path = descriptor.path_for(locale).map_err(ErrorKind::remote)?;
        let destination = self.cache_dir.join(cache_filename(remote_path)?);
        fs::create_dir_all(&self.cache_dir).await.or_raise(|| ErrorKind::Io)?;
        match fs::metadata(&destination).await {
            Ok(meta) if meta.is_file() => return Ok(Resolution::Cached(destination)),
            // A directory or other non-file holds the name; extraction could never replace it.
            Ok(_) => exn::bail!(ErrorKind::Io),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
        }
        Ok(Resolution::Fetch { remote_path: remote_path.to_string(), destination })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    const EN_PATH: &str = "/common/destiny2_content/sqlite/en/world_sql_content_7f2c.content";

    fn descriptor() -> ManifestDescriptor {
        ManifestDescriptor::new("1", HashMap::from([("en".to_string(), EN_PATH.to_string())]))
    }

    #[rstest]
    #[case(EN_PATH, "world_sql_content_7f2c.content")]
    #[case("world.content", "world.content")]
    #[case("/a/b/c.content/", "c.content")]
    fn test_cache_filename(#[case] remote: &str, #[case] expected: &str) {
        assert_eq!(cache_filename(remote).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("/common/..")]
    #[case("/common/./")]
    #[case("/common/evil\\..\\name")]
    fn test_cache_filename_rejects(#[case] remote: &str) {
        assert_eq!(*cache_filename(remote).unwrap_err(), ErrorKind::Metadata);
    }

    #[test]
    fn test_cache_filename_is_deterministic() {
        assert_eq!(cache_filename(EN_PATH).unwrap(), cache_filename(EN_PATH).unwrap());
        assert_ne!(
            cache_filename(EN_PATH).unwrap(),
            cache_filename("/common/destiny2_content/sqlite/en/world_sql_content_8a11.content").unwrap()
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_file_needs_fetch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_dir = temp_dir.path().join("nested/cache");
        let resolver = CacheResolver::new(&cache_dir);
        let resolution = resolver.resolve(&descriptor(), "en").await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Fetch {
                remote_path: EN_PATH.to_string(),
                destination: cache_dir.join("world_sql_content_7f2c.content"),
            }
        );
        assert!(cache_dir.is_dir());
    }

    #[tokio::test]
    async fn test_resolve_existing_file_is_cached() {
        let temp_dir = tempfile::tempdir().unwrap();
        let existing = temp_dir.path().join("world_sql_content_7f2c.content");
        std::fs::write(&existing, b"anything at all").unwrap();
        let resolver = CacheResolver::new(temp_dir.path());
        let resolution = resolver.resolve(&descriptor(), "en").await.unwrap();
        assert_eq!(resolution, Resolution::Cached(existing));
    }

    #[tokio::test]
    async fn test_resolve_directory_under_cache_name_is_io() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("world_sql_content_7f2c.content")).unwrap();
        let resolver = CacheResolver::new(temp_dir.path());
        let err = resolver.resolve(&descriptor(), "en").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }

    #[tokio::test]
    async fn test_resolve_unknown_locale() {
        let temp_dir = tempfile::tempdir().unwrap();
        let resolver = CacheResolver::new(temp_dir.path());
        let err = resolver.resolve(&descriptor(), "ko").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Metadata);
    }
}
