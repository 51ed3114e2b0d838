//! Throwaway manifest databases for tests.

use crate::row_id;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use std::path::Path;

pub(crate) const CLASSES: &str = "DestinyClassDefinition";

/// Hashes on both sides of `i32::MAX`, so the signed reinterpretation matters.
pub(crate) fn class_rows() -> Vec<(u32, String)> {
    vec![
        (671_679_327, r#"{"hash":671679327,"index":1,"name":"Hunter"}"#.to_string()),
        (2_271_682_572, r#"{"hash":2271682572,"index":2,"name":"Warlock"}"#.to_string()),
        (3_655_393_761, r#"{"hash":3655393761,"index":0,"name":"Titan"}"#.to_string()),
    ]
}

pub(crate) async fn writable(path: &Path) -> SqliteConnection {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .unwrap()
}

/// Create `table` in the database at `path` (creating the file if needed)
/// with the publisher's layout, and fill it with `rows` stored as TEXT.
pub(crate) async fn seed(path: &Path, table: &str, rows: &[(u32, String)]) {
    let mut conn = writable(path).await;
    sqlx::query(&format!(r#"CREATE TABLE "{table}" (id INTEGER PRIMARY KEY NOT NULL, json BLOB)"#))
        .execute(&mut conn)
        .await
        .unwrap();
    for (hash, json) in rows {
        sqlx::query(&format!(r#"INSERT INTO "{table}" (id, json) VALUES (?, ?)"#))
            .bind(row_id(*hash))
            .bind(json.as_str())
            .execute(&mut conn)
            .await
            .unwrap();
    }
    conn.close().await.unwrap();
}
