//! Typed lookups over type-erased entity tables.
//!
//! Every entity table has the same two columns: `id`, the entity's 32-bit
//! hash stored as a *signed* integer, and `json`, the entity itself. The
//! accessor doesn't know or care which entity lives in which table; the
//! caller names both the table and the type to decode into.

use crate::error::{ErrorKind, Result};
use crate::models::RecordRow;
use crate::{Store, Table};
use exn::{OptionExt, ResultExt};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use tracing::instrument;

/// Convert an entity hash into the key it is stored under.
///
/// Hashes are unsigned 32-bit values but the publisher writes them into a
/// signed 32-bit column, so the bits are reinterpreted rather than converted:
/// `3_655_393_761` is stored as `-639_573_535`.
#[inline]
#[must_use]
pub fn row_id(hash: u32) -> i32 {
    i32::from_ne_bytes(hash.to_ne_bytes())
}

/// Stateless query wrapper borrowing a [`Store`]'s connection pool.
#[derive(Debug, Clone, Copy)]
pub struct Accessor<'s> {
    pool: &'s SqlitePool,
}
impl<'s> From<&'s Store> for Accessor<'s> {
    fn from(store: &'s Store) -> Self {
        Self { pool: store.pool() }
    }
}

impl Accessor<'_> {
    /// Look up a single entity by hash and decode it as `T`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if no row has this hash.
    /// - [`ErrorKind::Decode`] if the stored record doesn't fit `T`.
    /// - [`ErrorKind::InvalidTable`] or [`ErrorKind::Query`] if the table name
    ///   is malformed or the table doesn't exist.
    #[instrument(skip(self), fields(row_id = row_id(hash)))]
    pub async fn get<T: DeserializeOwned>(&self, table: &str, hash: u32) -> Result<T> {
        let table = Table::new(table)?;
        let sql = format!(r#"SELECT json FROM "{table}" WHERE id = ?"#);
        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(row_id(hash))
            .fetch_optional(self.pool)
            .await
            .or_raise(|| ErrorKind::Query)?;
        row.ok_or_raise(|| ErrorKind::NotFound(table.to_string(), hash))?.decode(table)
    }

    /// Decode every entity in a table as `T`.
    ///
    /// Rows come back in whatever order the engine produces them. Decoding
    /// stops at the first record that doesn't fit `T`, and the whole call
    /// fails: there are no partial results.
    #[instrument(skip(self), fields(rows))]
    pub async fn get_all<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let table = Table::new(table)?;
        let sql = format!(r#"SELECT json FROM "{table}""#);
        let mut rows = sqlx::query_as::<_, RecordRow>(&sql).fetch(self.pool);
        let mut values = Vec::new();
        while let Some(row) = rows.try_next().await.or_raise(|| ErrorKind::Query)? {
            values.push(row.decode(table)?);
        }
        tracing::Span::current().record("rows", values.len());
        Ok(values)
    }

    /// Number of entities in a table.
    pub async fn count(&self, table: &str) -> Result<u64> {
        let table = Table::new(table)?;
        let sql = format!(r#"SELECT count(*) FROM "{table}""#);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(self.pool).await.or_raise(|| ErrorKind::Query)?;
        u64::try_from(count).or_raise(|| ErrorKind::Query)
    }
}
