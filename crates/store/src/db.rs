//! Database handle over the local manifest file.

use crate::Accessor;
use crate::error::{ErrorKind, Result};
use crate::models::TableRow;
use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

// Reads are independent point lookups and scans, a handful is plenty.
const MAX_CONNECTIONS: u32 = 4;
// The file has already been checked by the time the pool connects.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only handle on a manifest database file.
///
/// The file is opened, never created, and never written to. The handle owns
/// the connection pool for as long as it (or a clone) is alive; dropping the
/// last clone releases the file. Queries go through an [`Accessor`].
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    path: PathBuf,
}

impl Store {
    /// Open the manifest database at the given path.
    ///
    /// Fails with [`ErrorKind::Open`] if the file does not exist, cannot be
    /// read, or is not an SQLite database. Failures are reported at once; the
    /// file is checked over a single connection before the pool is built, as
    /// the pool keeps retrying a failing connection until it times out.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new().filename(&path).read_only(true).create_if_missing(false);
        Self::check(&options).await.or_raise(|| ErrorKind::Open(path.clone()))?;
        let pool = SqlitePoolOptions::new()
            // Applied to every connection the pool opens, not just the first.
            .after_connect(|conn, _meta| Box::pin(async move { Self::apply_pragmas(conn).await }))
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Open(path.clone()))?;
        Ok(Self { pool, path })
    }

    /// Apply PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA query_only = ON;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
                PRAGMA mmap_size = 33554432;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    /// SQLite happily "opens" any file; the header is only checked on first
    /// read. Read the schema now so a corrupt file fails here and not on the
    /// first lookup.
    async fn check(options: &SqliteConnectOptions) -> sqlx::Result<()> {
        let mut conn = options.connect().await?;
        Self::apply_pragmas(&mut conn).await?;
        let probed = sqlx::query("SELECT count(*) FROM sqlite_master").fetch_one(&mut conn).await;
        conn.close().await?;
        probed.map(|_| ())
    }

    /// Path of the database file this store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Borrow the store for lookups.
    pub fn accessor(&self) -> Accessor<'_> {
        Accessor::from(self)
    }

    /// Names of all entity tables, sorted.
    pub async fn tables(&self) -> Result<Vec<String>> {
        let rows: Vec<TableRow> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .or_raise(|| ErrorKind::Query)?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }

    /// Close the connection pool.
    ///
    /// Waits for checked-out connections to be returned first. Dropping the
    /// store has the same effect eventually; this just makes it deterministic.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use std::time::Instant;

    #[tokio::test]
    async fn test_open_existing_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("world.content");
        fixture::seed(&path, fixture::CLASSES, &fixture::class_rows()).await;

        let store = Store::open(&path).await.unwrap();
        assert_eq!(store.path(), path);
        assert!(!store.pool().is_closed());
        store.close().await;
        assert!(store.pool().is_closed());
    }

    #[tokio::test]
    async fn test_open_missing_file_does_not_create_it() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.content");
        let err = Store::open(&path).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Open(path.clone()));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_open_corrupt_file_fails_immediately() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("corrupt.content");
        std::fs::write(&path, vec![0xAB; 4096]).unwrap();

        let started = Instant::now();
        let err = Store::open(&path).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Open(path));
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_store_is_read_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("world.content");
        fixture::seed(&path, fixture::CLASSES, &fixture::class_rows()).await;
        let before = std::fs::read(&path).unwrap();

        let store = Store::open(&path).await.unwrap();
        let result = sqlx::query(r#"INSERT INTO "DestinyClassDefinition" (id, json) VALUES (1, '{}')"#)
            .execute(store.pool())
            .await;
        assert!(result.is_err());
        store.close().await;
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_tables() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("world.content");
        fixture::seed(&path, fixture::CLASSES, &fixture::class_rows()).await;
        fixture::seed(&path, "DestinyRaceDefinition", &[]).await;

        let store = Store::open(&path).await.unwrap();
        assert_eq!(store.tables().await.unwrap(), vec!["DestinyClassDefinition", "DestinyRaceDefinition"]);
        store.close().await;
    }

    #[tokio::test]
    async fn test_two_stores_over_one_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("world.content");
        fixture::seed(&path, fixture::CLASSES, &fixture::class_rows()).await;

        let first = Store::open(&path).await.unwrap();
        let second = Store::open(&path).await.unwrap();
        assert_eq!(first.tables().await.unwrap(), second.tables().await.unwrap());
        first.close().await;
        second.close().await;
    }
}
