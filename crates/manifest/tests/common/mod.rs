//! Shared fixtures for the end-to-end open tests.
#![allow(dead_code)]

use httpmock::Method::GET;
use httpmock::{Mock, MockServer};
use manifest::Config;
use serde::Deserialize;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use std::io::{Cursor, Write};
use std::net::TcpListener;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CLASSES: &str = "DestinyClassDefinition";
pub const VERSION: &str = "227151.24.10.08.1730-1-bnet.57283";
const PATH_PREFIX: &str = "/common/destiny2_content/sqlite/en/";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Class {
    pub hash: u32,
    pub index: u32,
    pub name: String,
}

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn class_rows() -> Vec<(u32, &'static str)> {
    vec![
        (671_679_327, r#"{"hash":671679327,"index":1,"name":"Hunter"}"#),
        (2_271_682_572, r#"{"hash":2271682572,"index":2,"name":"Warlock"}"#),
        (3_655_393_761, r#"{"hash":3655393761,"index":0,"name":"Titan"}"#),
    ]
}

pub fn remote_path(name: &str) -> String {
    format!("{PATH_PREFIX}{name}")
}

/// Bytes of a small manifest database holding the class table.
pub async fn database_bytes() -> Vec<u8> {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("world.content");
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .unwrap();
    sqlx::query(&format!(r#"CREATE TABLE "{CLASSES}" (id INTEGER PRIMARY KEY NOT NULL, json BLOB)"#))
        .execute(&mut conn)
        .await
        .unwrap();
    for (hash, json) in class_rows() {
        sqlx::query(&format!(r#"INSERT INTO "{CLASSES}" (id, json) VALUES (?, ?)"#))
            .bind(manifest::row_id(hash))
            .bind(json)
            .execute(&mut conn)
            .await
            .unwrap();
    }
    conn.close().await.unwrap();
    std::fs::read(&path).unwrap()
}

pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn config_for(server: &MockServer, cache_dir: &Path) -> Config {
    Config { base_url: server.base_url(), cache_dir: cache_dir.to_path_buf(), ..Config::default() }
}

/// Metadata endpoint answering with one `en` path.
pub async fn mock_metadata<'a>(server: &'a MockServer, en_path: &str) -> Mock<'a> {
    let body = json!({
        "Response": {
            "version": VERSION,
            "mobileWorldContentPaths": { "en": en_path }
        },
        "ErrorCode": 1,
        "ErrorStatus": "Success",
        "Message": "Ok"
    });
    server
        .mock_async(|when, then| {
            when.method(GET).path(manifest::MANIFEST_ENDPOINT);
            then.status(200).json_body(body);
        })
        .await
}

pub async fn mock_archive<'a>(server: &'a MockServer, path: &str, status: u16, body: Vec<u8>) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(status).body(body);
        })
        .await
}
