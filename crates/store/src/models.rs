use crate::Table;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// The one column every entity table is read through.
pub(crate) struct RecordRow {
    pub(crate) json: Vec<u8>,
}
impl<'r> FromRow<'r, SqliteRow> for RecordRow {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        // The column is declared BLOB but the values are usually TEXT; skip
        // the declared-type check and read whatever bytes are stored.
        Ok(Self { json: row.try_get_unchecked("json")? })
    }
}
impl RecordRow {
    pub(crate) fn decode<T: DeserializeOwned>(&self, table: Table<'_>) -> Result<T> {
        serde_json::from_slice(&self.json).or_raise(|| ErrorKind::Decode(table.to_string()))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TableRow {
    pub(crate) name: String,
}
